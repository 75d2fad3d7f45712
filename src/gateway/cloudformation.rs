//! CloudFormation-backed gateway
//!
//! Production implementation of [`StackGateway`] on top of the AWS SDK.
//! Requests built by the deploy core are translated field-for-field into the
//! SDK's fluent builders; unset options stay unset so service-side defaults
//! apply. Waits are bounded poll loops over the describe operations.

use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::config::Credentials;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{
    Capability, OnFailure, Parameter as CfnParameter, Stack as CfnStack, Tag as CfnTag,
};
use aws_sdk_cloudformation::Client;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use tracing::debug;

use super::{
    ChangeSetDescription, ChangeSetStatus, CreateChangeSetRequest, CreateStackRequest,
    ExecutionStatus, GatewayError, OnFailurePolicy, OperationAck, StackGateway, StackOperation,
    StackSnapshot,
};
use crate::config::ClientConfig;
use crate::params::Parameter;

/// Polling settings for the wait operations
#[derive(Debug, Clone)]
pub struct WaiterConfig {
    /// Delay between polls
    pub delay: Duration,

    /// Maximum number of polls before giving up
    pub max_attempts: u32,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

/// `StackGateway` implementation backed by the AWS CloudFormation client
pub struct CloudFormationGateway {
    client: Client,
    waiter: WaiterConfig,
}

impl CloudFormationGateway {
    /// Wraps an already-constructed SDK client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            waiter: WaiterConfig::default(),
        }
    }

    /// Builds the SDK client from a [`ClientConfig`] and wraps it.
    ///
    /// Static credentials are installed when both halves are present;
    /// otherwise the ambient AWS credential chain resolves them.
    pub async fn connect(config: &ClientConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            debug!(endpoint = %endpoint, "using endpoint override");
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                config.session_token.clone(),
                None,
                "stackdeploy-static",
            ));
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }

    /// Overrides the polling settings used by the wait operations.
    pub fn with_waiter_config(mut self, waiter: WaiterConfig) -> Self {
        self.waiter = waiter;
        self
    }
}

#[async_trait::async_trait]
impl StackGateway for CloudFormationGateway {
    async fn describe_stack(&self, name: &str) -> Result<StackSnapshot, GatewayError> {
        let resp = self
            .client
            .describe_stacks()
            .stack_name(name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let stack = resp
            .stacks()
            .first()
            .ok_or_else(|| GatewayError::NotFound(format!("stack {} does not exist", name)))?;

        Ok(snapshot_from(stack))
    }

    async fn create_stack(
        &self,
        request: &CreateStackRequest,
    ) -> Result<OperationAck, GatewayError> {
        let resp = self
            .client
            .create_stack()
            .stack_name(&request.stack_name)
            .on_failure(match request.on_failure {
                OnFailurePolicy::Rollback => OnFailure::Rollback,
                OnFailurePolicy::DoNothing => OnFailure::DoNothing,
            })
            .set_template_body(request.template_body.clone())
            .set_template_url(request.template_url.clone())
            .set_capabilities(to_sdk_capabilities(&request.capabilities))
            .set_role_arn(request.role_arn.clone())
            .set_parameters(to_sdk_parameters(&request.parameters))
            .set_tags(to_sdk_tags(&request.tags)?)
            .set_notification_arns(request.notification_arns.clone())
            .set_enable_termination_protection(request.enable_termination_protection)
            .set_timeout_in_minutes(request.timeout_in_minutes.map(|minutes| minutes as i32))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(OperationAck::ok(resp.stack_id().map(str::to_string)))
    }

    async fn create_change_set(
        &self,
        request: &CreateChangeSetRequest,
    ) -> Result<OperationAck, GatewayError> {
        let resp = self
            .client
            .create_change_set()
            .stack_name(&request.stack_name)
            .change_set_name(&request.change_set_name)
            .set_template_body(request.template_body.clone())
            .set_template_url(request.template_url.clone())
            .set_capabilities(to_sdk_capabilities(&request.capabilities))
            .set_role_arn(request.role_arn.clone())
            .set_parameters(to_sdk_parameters(&request.parameters))
            .set_tags(to_sdk_tags(&request.tags)?)
            .set_notification_arns(request.notification_arns.clone())
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(OperationAck::ok(resp.stack_id().map(str::to_string)))
    }

    async fn describe_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<ChangeSetDescription, GatewayError> {
        let resp = self
            .client
            .describe_change_set()
            .change_set_name(change_set_name)
            .stack_name(stack_name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(ChangeSetDescription {
            status: resp
                .status()
                .map(|status| ChangeSetStatus::parse(status.as_str()))
                .unwrap_or_else(|| ChangeSetStatus::Other("UNKNOWN".to_string())),
            execution_status: resp
                .execution_status()
                .map(|status| ExecutionStatus::parse(status.as_str()))
                .unwrap_or_else(|| ExecutionStatus::Other("UNKNOWN".to_string())),
            status_reason: resp.status_reason().map(str::to_string),
            parameters: resp.parameters().iter().map(from_sdk_parameter).collect(),
        })
    }

    async fn delete_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<(), GatewayError> {
        self.client
            .delete_change_set()
            .change_set_name(change_set_name)
            .stack_name(stack_name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    async fn execute_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<OperationAck, GatewayError> {
        self.client
            .execute_change_set()
            .change_set_name(change_set_name)
            .stack_name(stack_name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(OperationAck::ok(None))
    }

    async fn wait_for_stack(
        &self,
        name: &str,
        operation: StackOperation,
    ) -> Result<StackSnapshot, GatewayError> {
        let (success, failures) = stack_wait_targets(operation);

        for attempt in 0..self.waiter.max_attempts {
            let snapshot = self.describe_stack(name).await?;

            if snapshot.status == success {
                return Ok(snapshot);
            }

            if failures.contains(&snapshot.status.as_str()) {
                return Err(GatewayError::OperationFailed {
                    status: snapshot.status,
                    reason: None,
                });
            }

            debug!(
                stack = %name,
                status = %snapshot.status,
                attempt,
                "stack not settled yet"
            );
            tokio::time::sleep(self.waiter.delay).await;
        }

        Err(GatewayError::Timeout {
            attempts: self.waiter.max_attempts,
        })
    }

    async fn wait_for_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<ChangeSetDescription, GatewayError> {
        for attempt in 0..self.waiter.max_attempts {
            let description = self
                .describe_change_set(change_set_name, stack_name)
                .await?;

            match &description.status {
                ChangeSetStatus::CreateComplete => return Ok(description),
                ChangeSetStatus::Failed | ChangeSetStatus::DeleteFailed => {
                    return Err(GatewayError::ChangeSetFailed {
                        status: description.status.as_str().to_string(),
                        reason: description.status_reason.clone(),
                    });
                }
                _ => {}
            }

            debug!(
                change_set = %change_set_name,
                status = %description.status.as_str(),
                attempt,
                "change set not settled yet"
            );
            tokio::time::sleep(self.waiter.delay).await;
        }

        Err(GatewayError::Timeout {
            attempts: self.waiter.max_attempts,
        })
    }
}

fn stack_wait_targets(operation: StackOperation) -> (&'static str, &'static [&'static str]) {
    match operation {
        StackOperation::Create => (
            "CREATE_COMPLETE",
            &[
                "CREATE_FAILED",
                "DELETE_COMPLETE",
                "DELETE_FAILED",
                "ROLLBACK_COMPLETE",
                "ROLLBACK_FAILED",
            ],
        ),
        StackOperation::Update => (
            "UPDATE_COMPLETE",
            &[
                "UPDATE_FAILED",
                "UPDATE_ROLLBACK_COMPLETE",
                "UPDATE_ROLLBACK_FAILED",
            ],
        ),
    }
}

fn snapshot_from(stack: &CfnStack) -> StackSnapshot {
    StackSnapshot {
        name: stack.stack_name().unwrap_or_default().to_string(),
        id: stack.stack_id().map(str::to_string),
        status: stack
            .stack_status()
            .map(|status| status.as_str().to_string())
            .unwrap_or_default(),
        parameters: stack.parameters().iter().map(from_sdk_parameter).collect(),
        change_set_id: stack.change_set_id().map(str::to_string),
    }
}

fn from_sdk_parameter(parameter: &CfnParameter) -> Parameter {
    Parameter::new(
        parameter.parameter_key().unwrap_or_default(),
        parameter.parameter_value().unwrap_or_default(),
    )
}

fn to_sdk_parameters(parameters: &Option<Vec<Parameter>>) -> Option<Vec<CfnParameter>> {
    parameters.as_ref().map(|parameters| {
        parameters
            .iter()
            .map(|parameter| {
                CfnParameter::builder()
                    .parameter_key(&parameter.key)
                    .parameter_value(&parameter.value)
                    .build()
            })
            .collect()
    })
}

fn to_sdk_capabilities(capabilities: &Option<Vec<String>>) -> Option<Vec<Capability>> {
    capabilities.as_ref().map(|capabilities| {
        capabilities
            .iter()
            .map(|capability| Capability::from(capability.as_str()))
            .collect()
    })
}

fn to_sdk_tags(
    tags: &Option<Vec<(String, String)>>,
) -> Result<Option<Vec<CfnTag>>, GatewayError> {
    let Some(tags) = tags else {
        return Ok(None);
    };

    let tags = tags
        .iter()
        .map(|(key, value)| CfnTag::builder().key(key).value(value).build())
        .collect::<Vec<_>>();

    Ok(Some(tags))
}

fn map_sdk_error<E>(err: SdkError<E, HttpResponse>) -> GatewayError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status_code = match &err {
        SdkError::ServiceError(context) => Some(context.raw().status().as_u16()),
        _ => None,
    };

    let code = err
        .as_service_error()
        .and_then(|service_err| service_err.code())
        .map(str::to_string);
    let message = err
        .as_service_error()
        .and_then(|service_err| service_err.message())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}", DisplayErrorContext(&err)));

    match code.as_deref() {
        // CloudFormation reports a missing stack as a ValidationError; only
        // the "does not exist" flavor means not-found.
        Some("ValidationError") if message.contains("does not exist") => {
            GatewayError::NotFound(message)
        }
        Some(_) => GatewayError::Validation {
            message,
            status_code,
        },
        None => GatewayError::Transport {
            message,
            status_code,
        },
    }
}
