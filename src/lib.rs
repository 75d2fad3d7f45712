//! stackdeploy - one-shot CloudFormation stack deployment
//!
//! This library reconciles a named CloudFormation stack with a desired
//! template and parameter set: it creates the stack when it does not exist
//! and stages a change set against it when it does, optionally blocking
//! until the operation settles.
//!
//! # Core Concepts
//!
//! - **Stack Gateway**: the pluggable client trait the core talks to the
//!   remote service through; production code uses the CloudFormation
//!   implementation, tests use a scripted mock
//! - **Reconciliation**: the create-vs-update decision plus the change set
//!   lifecycle that applies an incremental update
//! - **Change descriptor**: the sparse deployment options mapped into the
//!   create-stack and create-change-set request shapes
//!
//! # Example Usage
//!
//! ```ignore
//! use stackdeploy::{ClientConfig, DeployOptions, StackReconciler, TemplateSource};
//! use stackdeploy::gateway::CloudFormationGateway;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! async fn deploy() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = TemplateSource::File(PathBuf::from("stack.json"));
//!     let mut options = DeployOptions::new("demo", template);
//!     options.wait_for_completion = true;
//!
//!     let config = ClientConfig::from_env();
//!     let gateway = CloudFormationGateway::connect(&config).await;
//!
//!     let reconciler = StackReconciler::new(options, Arc::new(gateway));
//!     let result = reconciler.deploy().await?;
//!
//!     println!("deployed: {:?}", result.stack_id);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`deploy`]: reconciler, change set manager, descriptor builder
//! - [`gateway`]: the gateway trait, the CloudFormation client, the mock
//! - [`template`] / [`params`]: template source and parameter override inputs

// Public modules
pub mod cli;
pub mod config;
pub mod deploy;
pub mod gateway;
pub mod params;
pub mod template;
pub mod util;

// Re-export key types for convenient access
pub use config::{ClientConfig, ConfigError};
pub use deploy::{DeployError, DeployOptions, ReconcileResult, StackReconciler};
pub use gateway::{GatewayError, StackGateway, StackSnapshot};
pub use params::{parameter_overrides, Parameter};
pub use template::{ResolvedTemplate, TemplateSource};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_stackdeploy() {
        assert_eq!(NAME, "stackdeploy");
    }
}
