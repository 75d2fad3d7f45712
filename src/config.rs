//! Client configuration
//!
//! Holds everything needed to construct the remote CloudFormation client:
//! region, an optional endpoint override (useful against LocalStack), and
//! optional static credentials. When no static credentials are given, the
//! client falls back to the ambient AWS credential chain (environment,
//! profile, instance role).
//!
//! # Environment Variables
//!
//! - `AWS_REGION` / `AWS_DEFAULT_REGION`: region fallback for `--region`
//! - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`:
//!   static credentials
//! - `AWS_ENDPOINT_URL`: endpoint fallback for `--endpoint-url`

use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No region available from flags or environment
    #[error("region not specified. Pass --region or set AWS_REGION")]
    MissingRegion,

    /// Only one half of a static credential pair was supplied
    #[error("access key id and secret access key must be provided together")]
    PartialCredentials,
}

/// Connection settings for the remote stack-management service
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// AWS region (required)
    pub region: String,

    /// Endpoint override, e.g. http://localhost:4566 for LocalStack
    pub endpoint: Option<String>,

    /// Static access key id; falls back to the default credential chain
    /// when absent
    pub access_key_id: Option<String>,

    /// Static secret access key
    pub secret_access_key: Option<String>,

    /// Optional session token for temporary credentials
    pub session_token: Option<String>,
}

impl ClientConfig {
    /// Creates a configuration from the environment alone.
    pub fn from_env() -> Self {
        Self {
            region: env::var("AWS_REGION")
                .or_else(|_| env::var("AWS_DEFAULT_REGION"))
                .unwrap_or_default(),
            endpoint: env::var("AWS_ENDPOINT_URL").ok(),
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            session_token: env::var("AWS_SESSION_TOKEN").ok(),
        }
    }

    /// Validates that the configuration is usable.
    ///
    /// Static credentials are optional, but supplying only one half of the
    /// key pair is always a mistake.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::MissingRegion);
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(ConfigError::PartialCredentials);
        }

        Ok(())
    }

    /// True when both halves of a static credential pair are present.
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}
