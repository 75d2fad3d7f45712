//! Stack reconciliation
//!
//! The reconciler decides between the create and update paths by querying
//! the gateway for the named stack, then drives the chosen path to a single
//! [`ReconcileResult`]. The gateway handle is injected; the reconciler never
//! constructs a client itself.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::gateway::{GatewayError, StackGateway, StackOperation, StackSnapshot};

use super::change_set::{ChangeSetManager, ChangeSetPlan};
use super::descriptor;
use super::options::DeployOptions;
use super::{DeployError, ReconcileResult};

/// One-shot reconciliation of a named stack against a desired template
pub struct StackReconciler {
    options: DeployOptions,
    gateway: Arc<dyn StackGateway>,
    change_sets: ChangeSetManager,
}

impl StackReconciler {
    pub fn new(options: DeployOptions, gateway: Arc<dyn StackGateway>) -> Self {
        let change_sets = ChangeSetManager::new(Arc::clone(&gateway));
        Self {
            options,
            gateway,
            change_sets,
        }
    }

    /// Reconciles the stack: create when absent, update via change set when
    /// present.
    pub async fn deploy(&self) -> Result<ReconcileResult, DeployError> {
        self.options.validate()?;

        match self.find_stack(&self.options.stack_name).await? {
            None => self.create().await,
            Some(stack) => self.update(stack).await,
        }
    }

    /// Queries for the stack, mapping the service's not-found signal to
    /// `None`. Every other failure propagates unchanged.
    async fn find_stack(&self, name: &str) -> Result<Option<StackSnapshot>, DeployError> {
        match self.gateway.describe_stack(name).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(GatewayError::NotFound(_)) => {
                debug!(stack = %name, "stack does not exist yet");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn create(&self) -> Result<ReconcileResult, DeployError> {
        info!(stack = %self.options.stack_name, "creating stack");

        // Template problems are configuration errors, raised before anything
        // is submitted.
        let template = self.options.template.resolve()?;
        let request = descriptor::build_create_stack(&self.options, &template);

        let submitted = self.gateway.create_stack(&request).await;

        let outcome = match submitted {
            Ok(ack) if self.options.wait_for_completion => {
                debug!("waiting for stack creation");
                self.gateway
                    .wait_for_stack(&self.options.stack_name, StackOperation::Create)
                    .await
                    .map(|_| ack)
            }
            other => other,
        };

        match outcome {
            Ok(ack) => Ok(ReconcileResult {
                status: ack.status,
                stack_id: ack.id,
            }),
            Err(err) => {
                warn!(stack = %self.options.stack_name, error = %err, "stack creation failed");
                let status = match err.status_code() {
                    Some(code) => code.to_string(),
                    None => err.to_string(),
                };
                Ok(ReconcileResult {
                    status,
                    stack_id: None,
                })
            }
        }
    }

    async fn update(&self, stack: StackSnapshot) -> Result<ReconcileResult, DeployError> {
        // The snapshot can lack an id if the stack vanished between the
        // describe and now; there is nothing to update then.
        let Some(stack_id) = stack.id else {
            warn!(stack = %self.options.stack_name, "stack disappeared before update");
            return Ok(ReconcileResult {
                status: "404".to_string(),
                stack_id: None,
            });
        };

        info!(stack = %self.options.stack_name, "updating stack via change set");

        let template = self.options.template.resolve()?;
        let change_set_name = descriptor::change_set_name(&self.options.stack_name);
        let request = descriptor::build_change_set(&self.options, &template, &change_set_name);

        let plan = ChangeSetPlan {
            request,
            wait_for: self.options.wait_for_completion,
            execute: true,
            delete_failed: self.options.delete_failed_change_sets,
        };

        let applied = self.change_sets.apply(&plan).await?;
        debug!(status = %applied.status, "change set pass finished");

        // The update path reports a fixed success code; manager failures
        // have already propagated above.
        Ok(ReconcileResult {
            status: "200".to_string(),
            stack_id: Some(stack_id),
        })
    }
}
