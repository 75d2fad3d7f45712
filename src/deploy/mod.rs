//! Stack reconciliation core
//!
//! The deploy module owns the decision of whether to create or update a
//! stack, the construction of change descriptors from sparse options, and
//! the change set lifecycle. It talks to the service exclusively through the
//! [`StackGateway`](crate::gateway::StackGateway) trait.

use serde::Serialize;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::template::TemplateError;

pub mod change_set;
pub mod descriptor;
pub mod options;
pub mod reconciler;

pub use change_set::{ChangeSetManager, ChangeSetPlan};
pub use options::DeployOptions;
pub use reconciler::StackReconciler;

/// Errors surfaced by a deploy invocation
#[derive(Debug, Error)]
pub enum DeployError {
    /// Invalid options, detected before any remote call
    #[error("configuration error: {0}")]
    Config(String),

    /// Template selection or resolution failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A gateway operation failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// The sole value a deploy returns to its caller
///
/// `status` is a string status code rather than a structured error, so the
/// boundary stays trivial to log and propagate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
}

impl ReconcileResult {
    /// True when the status denotes a successful outcome.
    pub fn is_success(&self) -> bool {
        matches!(self.status.as_str(), "200" | "201")
    }
}
