//! Deployment options
//!
//! A sparse bag of knobs: every optional field that stays unset is simply
//! left out of the requests built from it, so the service applies its own
//! defaults.

use crate::params::Parameter;
use crate::template::TemplateSource;

use super::DeployError;

/// Options for a single deploy invocation
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Name of the stack to create or update
    pub stack_name: String,

    /// Where the template comes from
    pub template: TemplateSource,

    /// Capability acknowledgement flags (e.g. CAPABILITY_IAM)
    pub capabilities: Vec<String>,

    /// Stack creation timeout; create-only
    pub timeout_minutes: Option<u32>,

    /// Block until the operation settles
    pub wait_for_completion: bool,

    /// Execute the change set after it is ready (update path)
    pub execute_change_set: bool,

    /// Roll back on creation failure; off means leave the stack as-is
    pub enable_rollback: bool,

    /// Protect the created stack against deletion; create-only
    pub termination_protection: bool,

    /// Service role assumed by the stack operations
    pub role_arn: Option<String>,

    /// Tags applied to the stack, in insertion order
    pub tags: Vec<(String, String)>,

    /// SNS topic notified of stack events
    pub notification_arn: Option<String>,

    /// Template parameter overrides, order preserved
    pub parameter_overrides: Option<Vec<Parameter>>,

    /// Delete a change set the service flagged FAILED during cleanup
    pub delete_failed_change_sets: bool,
}

impl DeployOptions {
    /// Creates options with every knob at its default.
    pub fn new(stack_name: impl Into<String>, template: TemplateSource) -> Self {
        Self {
            stack_name: stack_name.into(),
            template,
            capabilities: Vec::new(),
            timeout_minutes: None,
            wait_for_completion: false,
            execute_change_set: false,
            enable_rollback: false,
            termination_protection: false,
            role_arn: None,
            tags: Vec::new(),
            notification_arn: None,
            parameter_overrides: None,
            delete_failed_change_sets: false,
        }
    }

    /// Rejects unusable options before any remote call is attempted.
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.stack_name.trim().is_empty() {
            return Err(DeployError::Config("stack name must not be empty".into()));
        }
        Ok(())
    }
}
