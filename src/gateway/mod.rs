//! Remote stack gateway abstraction
//!
//! This module defines the `StackGateway` trait and the types it exchanges.
//! The deploy core depends on the remote stack-management service only
//! through this trait, so the reconciler and change set manager can be
//! driven against the production CloudFormation client or a scripted mock.
//!
//! Errors are a closed enum rather than a probed error object: callers
//! branch on `GatewayError::NotFound` and friends, never on the shape of an
//! unknown error value.

use async_trait::async_trait;
use thiserror::Error;

use crate::params::Parameter;

pub mod cloudformation;
pub mod mock;

pub use cloudformation::{CloudFormationGateway, WaiterConfig};
pub use mock::{MockGateway, MockOutcome};

/// Errors returned by gateway operations
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The named stack does not exist. Recovered by the reconciler (it
    /// switches to the create path); never surfaced to the user as-is.
    #[error("stack not found: {0}")]
    NotFound(String),

    /// The service rejected the request (bad template, bad parameter,
    /// malformed input). Fatal.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        status_code: Option<u16>,
    },

    /// A stack reached a terminal failure state while being waited on.
    #[error("stack operation failed with status {status}{}", reason_suffix(.reason))]
    OperationFailed {
        status: String,
        reason: Option<String>,
    },

    /// A change set reached a terminal failure state. This covers both real
    /// failures and the service flagging a zero-change set as failed.
    #[error("change set was not created: {status}{}", reason_suffix(.reason))]
    ChangeSetFailed {
        status: String,
        reason: Option<String>,
    },

    /// A wait exhausted its polling budget.
    #[error("timed out after {attempts} polling attempts")]
    Timeout { attempts: u32 },

    /// Credential, network or other transport-level failure. Fatal.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" ({})", reason),
        None => String::new(),
    }
}

impl GatewayError {
    /// The service HTTP status code embedded in this error, if any.
    ///
    /// The create path surfaces this code directly as the result status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Validation { status_code, .. } => *status_code,
            GatewayError::Transport { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Read-only projection of a stack as reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSnapshot {
    pub name: String,
    pub id: Option<String>,
    pub status: String,
    pub parameters: Vec<Parameter>,
    pub change_set_id: Option<String>,
}

/// Terminal and transient states of a change set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSetStatus {
    CreatePending,
    CreateInProgress,
    CreateComplete,
    DeletePending,
    DeleteInProgress,
    DeleteComplete,
    DeleteFailed,
    Failed,
    Other(String),
}

impl ChangeSetStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "CREATE_PENDING" => ChangeSetStatus::CreatePending,
            "CREATE_IN_PROGRESS" => ChangeSetStatus::CreateInProgress,
            "CREATE_COMPLETE" => ChangeSetStatus::CreateComplete,
            "DELETE_PENDING" => ChangeSetStatus::DeletePending,
            "DELETE_IN_PROGRESS" => ChangeSetStatus::DeleteInProgress,
            "DELETE_COMPLETE" => ChangeSetStatus::DeleteComplete,
            "DELETE_FAILED" => ChangeSetStatus::DeleteFailed,
            "FAILED" => ChangeSetStatus::Failed,
            other => ChangeSetStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChangeSetStatus::CreatePending => "CREATE_PENDING",
            ChangeSetStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            ChangeSetStatus::CreateComplete => "CREATE_COMPLETE",
            ChangeSetStatus::DeletePending => "DELETE_PENDING",
            ChangeSetStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            ChangeSetStatus::DeleteComplete => "DELETE_COMPLETE",
            ChangeSetStatus::DeleteFailed => "DELETE_FAILED",
            ChangeSetStatus::Failed => "FAILED",
            ChangeSetStatus::Other(other) => other,
        }
    }
}

/// Execution state of a change set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Unavailable,
    Available,
    ExecuteInProgress,
    ExecuteComplete,
    ExecuteFailed,
    Obsolete,
    Other(String),
}

impl ExecutionStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "UNAVAILABLE" => ExecutionStatus::Unavailable,
            "AVAILABLE" => ExecutionStatus::Available,
            "EXECUTE_IN_PROGRESS" => ExecutionStatus::ExecuteInProgress,
            "EXECUTE_COMPLETE" => ExecutionStatus::ExecuteComplete,
            "EXECUTE_FAILED" => ExecutionStatus::ExecuteFailed,
            "OBSOLETE" => ExecutionStatus::Obsolete,
            other => ExecutionStatus::Other(other.to_string()),
        }
    }
}

/// Result of describing a change set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetDescription {
    pub status: ChangeSetStatus,
    pub execution_status: ExecutionStatus,
    pub status_reason: Option<String>,
    pub parameters: Vec<Parameter>,
}

/// Acknowledgement of a submitted operation
///
/// `error` carries a failure indicator that some transports embed inside a
/// nominally successful response envelope; callers must check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationAck {
    pub id: Option<String>,
    pub status: String,
    pub error: Option<String>,
}

impl OperationAck {
    pub fn ok(id: Option<String>) -> Self {
        Self {
            id,
            status: "200".to_string(),
            error: None,
        }
    }
}

/// Failure policy applied when stack creation goes wrong.
///
/// Unlike every other field of a create request this is always set, since
/// create requests require an explicit failure policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnFailurePolicy {
    Rollback,
    #[default]
    DoNothing,
}

/// Request to create a brand-new stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateStackRequest {
    pub stack_name: String,
    pub template_body: Option<String>,
    pub template_url: Option<String>,
    pub capabilities: Option<Vec<String>>,
    pub role_arn: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    pub tags: Option<Vec<(String, String)>>,
    pub notification_arns: Option<Vec<String>>,
    pub on_failure: OnFailurePolicy,
    pub enable_termination_protection: Option<bool>,
    pub timeout_in_minutes: Option<u32>,
}

/// Request to stage a change set against an existing stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateChangeSetRequest {
    pub stack_name: String,
    pub change_set_name: String,
    pub template_body: Option<String>,
    pub template_url: Option<String>,
    pub capabilities: Option<Vec<String>>,
    pub role_arn: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    pub tags: Option<Vec<(String, String)>>,
    pub notification_arns: Option<Vec<String>>,
}

/// Which long-running stack operation a wait targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOperation {
    Create,
    Update,
}

/// Operations the deploy core needs from the stack-management service
#[async_trait]
pub trait StackGateway: Send + Sync {
    /// Describes a single stack by name.
    ///
    /// A stack that does not exist yields `GatewayError::NotFound`, which is
    /// distinguishable from every other failure.
    async fn describe_stack(&self, name: &str) -> Result<StackSnapshot, GatewayError>;

    /// Submits a create-stack request.
    async fn create_stack(&self, request: &CreateStackRequest)
        -> Result<OperationAck, GatewayError>;

    /// Submits a create-change-set request.
    async fn create_change_set(
        &self,
        request: &CreateChangeSetRequest,
    ) -> Result<OperationAck, GatewayError>;

    /// Describes a change set by name within a stack.
    async fn describe_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<ChangeSetDescription, GatewayError>;

    /// Deletes a change set.
    async fn delete_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<(), GatewayError>;

    /// Executes a previously created change set.
    async fn execute_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<OperationAck, GatewayError>;

    /// Blocks until the stack settles into the operation's terminal state.
    ///
    /// Fails with `GatewayError::OperationFailed` when the stack lands in a
    /// failure state and `GatewayError::Timeout` when the polling budget is
    /// exhausted.
    async fn wait_for_stack(
        &self,
        name: &str,
        operation: StackOperation,
    ) -> Result<StackSnapshot, GatewayError>;

    /// Blocks until a change set reaches a terminal creation state.
    ///
    /// Resolves with the final description on success; fails with
    /// `GatewayError::ChangeSetFailed` when creation lands in FAILED.
    async fn wait_for_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<ChangeSetDescription, GatewayError>;
}
