//! Change set lifecycle
//!
//! A change set moves through a small state machine per invocation:
//!
//! ```text
//! SUBMITTED -> (wait_for?) -> PENDING -> {READY, ALREADY_EXECUTED, FAILED}
//! READY --(execute?)--> EXECUTING -> EXECUTED
//! FAILED --> CLEANUP (conditional) --> error propagated
//! ```
//!
//! Creation is always submitted. Without `wait_for` the manager returns the
//! submission acknowledgement as-is and never executes: execution requires a
//! confirmed stable change set, so `execute` alone is not enough. Cleanup of
//! a failed change set is a side effect only; the original failure is always
//! re-raised afterwards.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::gateway::{
    ChangeSetStatus, CreateChangeSetRequest, ExecutionStatus, GatewayError, StackGateway,
    StackOperation,
};

use super::{DeployError, ReconcileResult};

/// Everything one change set pass needs: the request plus behavior flags
#[derive(Debug, Clone)]
pub struct ChangeSetPlan {
    pub request: CreateChangeSetRequest,

    /// Wait for the change set (and any execution) to settle
    pub wait_for: bool,

    /// Execute the change set once it is ready
    pub execute: bool,

    /// Delete the change set during cleanup when the service flagged it
    /// FAILED
    pub delete_failed: bool,
}

/// Drives a change set from submission to its terminal state
pub struct ChangeSetManager {
    gateway: Arc<dyn StackGateway>,
}

impl ChangeSetManager {
    pub fn new(gateway: Arc<dyn StackGateway>) -> Self {
        Self { gateway }
    }

    /// Runs one pass of the state machine.
    pub async fn apply(&self, plan: &ChangeSetPlan) -> Result<ReconcileResult, DeployError> {
        let stack_name = &plan.request.stack_name;
        let change_set_name = &plan.request.change_set_name;

        let ack = self.gateway.create_change_set(&plan.request).await?;
        debug!(
            stack = %stack_name,
            change_set = %change_set_name,
            "change set submitted"
        );

        if !plan.wait_for {
            // Execution requires confirming the change set reached a stable
            // state first, so execute is ignored here even when requested.
            return Ok(ReconcileResult {
                status: ack.status,
                stack_id: ack.id,
            });
        }

        debug!("waiting for change set creation");
        match self.gateway.wait_for_change_set(change_set_name, stack_name).await {
            Ok(description) if description.execution_status == ExecutionStatus::ExecuteComplete => {
                // Zero net changes: the service resolved the change set on
                // its own, nothing left to execute.
                debug!("change set execution already complete");
                return Ok(ReconcileResult {
                    status: "200".to_string(),
                    stack_id: ack.id,
                });
            }
            Ok(_) => {}
            Err(err) => {
                warn!(
                    change_set = %change_set_name,
                    error = %err,
                    "change set creation failed, cleaning up"
                );
                self.cleanup(change_set_name, stack_name, plan.delete_failed)
                    .await;
                return Err(err.into());
            }
        }

        if plan.execute {
            debug!(change_set = %change_set_name, "executing change set");
            let exec = self
                .gateway
                .execute_change_set(change_set_name, stack_name)
                .await?;

            // Some transports report partial failures inside a success
            // envelope.
            if let Some(error) = exec.error {
                return Err(GatewayError::OperationFailed {
                    status: exec.status,
                    reason: Some(error),
                }
                .into());
            }

            // Best-effort: the execution has been accepted at this point, so
            // a wait failure downgrades to a warning.
            if let Err(err) = self
                .gateway
                .wait_for_stack(stack_name, StackOperation::Update)
                .await
            {
                warn!(
                    stack = %stack_name,
                    error = %err,
                    "stack update did not settle within the wait budget"
                );
            }
        }

        Ok(ReconcileResult {
            status: "200".to_string(),
            stack_id: ack.id,
        })
    }

    /// Inspects a failed change set and deletes it when allowed.
    ///
    /// Never returns an error: cleanup problems are logged and dropped so
    /// the original failure stays the one the caller sees.
    async fn cleanup(&self, change_set_name: &str, stack_name: &str, delete_failed: bool) {
        let description = match self
            .gateway
            .describe_change_set(change_set_name, stack_name)
            .await
        {
            Ok(description) => description,
            Err(err) => {
                warn!(
                    change_set = %change_set_name,
                    error = %err,
                    "could not describe change set during cleanup"
                );
                return;
            }
        };

        if description.status == ChangeSetStatus::Failed && delete_failed {
            debug!(change_set = %change_set_name, "deleting failed change set");
            if let Err(err) = self
                .gateway
                .delete_change_set(change_set_name, stack_name)
                .await
            {
                warn!(
                    change_set = %change_set_name,
                    error = %err,
                    "failed to delete change set"
                );
            }
        }
    }
}
