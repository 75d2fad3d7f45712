//! Change descriptor construction
//!
//! Maps sparse [`DeployOptions`] into the two request shapes the gateway
//! accepts. Both builders consume the same [`CommonFields`] mapping, so the
//! create-stack and change-set requests cannot drift apart: a field added to
//! the shared mapping lands in both.
//!
//! Unset options are left out of the built request entirely so the service's
//! own defaults apply. The one exception is the failure policy on create
//! requests, which is always set explicitly.

use crate::gateway::{CreateChangeSetRequest, CreateStackRequest, OnFailurePolicy};
use crate::params::Parameter;
use crate::template::ResolvedTemplate;

use super::options::DeployOptions;

/// The deterministic change set name for a stack.
///
/// Reusing one name per stack means repeated updates replace the previous
/// change set instead of proliferating identifiers.
pub fn change_set_name(stack_name: &str) -> String {
    format!("{}-changeset", stack_name)
}

/// The fields shared by both request shapes
struct CommonFields {
    template_body: Option<String>,
    template_url: Option<String>,
    capabilities: Option<Vec<String>>,
    role_arn: Option<String>,
    parameters: Option<Vec<Parameter>>,
    tags: Option<Vec<(String, String)>>,
    notification_arns: Option<Vec<String>>,
}

fn common_fields(options: &DeployOptions, template: &ResolvedTemplate) -> CommonFields {
    let (template_body, template_url) = match template {
        ResolvedTemplate::Body(body) => (Some(body.clone()), None),
        ResolvedTemplate::Url(url) => (None, Some(url.clone())),
    };

    CommonFields {
        template_body,
        template_url,
        capabilities: present(&options.capabilities),
        role_arn: options.role_arn.clone(),
        parameters: options.parameter_overrides.clone(),
        tags: present(&options.tags),
        notification_arns: options
            .notification_arn
            .as_ref()
            .map(|arn| vec![arn.clone()]),
    }
}

fn present<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Builds the request for the create path.
pub fn build_create_stack(
    options: &DeployOptions,
    template: &ResolvedTemplate,
) -> CreateStackRequest {
    let common = common_fields(options, template);

    CreateStackRequest {
        stack_name: options.stack_name.clone(),
        template_body: common.template_body,
        template_url: common.template_url,
        capabilities: common.capabilities,
        role_arn: common.role_arn,
        parameters: common.parameters,
        tags: common.tags,
        notification_arns: common.notification_arns,
        on_failure: if options.enable_rollback {
            OnFailurePolicy::Rollback
        } else {
            OnFailurePolicy::DoNothing
        },
        enable_termination_protection: options.termination_protection.then_some(true),
        timeout_in_minutes: options.timeout_minutes,
    }
}

/// Builds the request for the update path.
pub fn build_change_set(
    options: &DeployOptions,
    template: &ResolvedTemplate,
    change_set_name: &str,
) -> CreateChangeSetRequest {
    let common = common_fields(options, template);

    CreateChangeSetRequest {
        stack_name: options.stack_name.clone(),
        change_set_name: change_set_name.to_string(),
        template_body: common.template_body,
        template_url: common.template_url,
        capabilities: common.capabilities,
        role_arn: common.role_arn,
        parameters: common.parameters,
        tags: common.tags,
        notification_arns: common.notification_arns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateSource;
    use std::path::PathBuf;

    fn options() -> DeployOptions {
        DeployOptions::new("demo", TemplateSource::File(PathBuf::from("template.json")))
    }

    fn body() -> ResolvedTemplate {
        ResolvedTemplate::Body(r#"{"Resources": {}}"#.to_string())
    }

    #[test]
    fn test_change_set_name_is_deterministic() {
        assert_eq!(change_set_name("demo"), "demo-changeset");
        assert_eq!(change_set_name("demo"), change_set_name("demo"));
    }

    #[test]
    fn test_sparse_options_build_sparse_request() {
        let request = build_create_stack(&options(), &body());

        assert_eq!(request.stack_name, "demo");
        assert!(request.template_body.is_some());
        assert!(request.template_url.is_none());
        assert!(request.capabilities.is_none());
        assert!(request.role_arn.is_none());
        assert!(request.parameters.is_none());
        assert!(request.tags.is_none());
        assert!(request.notification_arns.is_none());
        assert!(request.enable_termination_protection.is_none());
        assert!(request.timeout_in_minutes.is_none());
    }

    #[test]
    fn test_on_failure_is_always_set() {
        let request = build_create_stack(&options(), &body());
        assert_eq!(request.on_failure, OnFailurePolicy::DoNothing);

        let mut with_rollback = options();
        with_rollback.enable_rollback = true;
        let request = build_create_stack(&with_rollback, &body());
        assert_eq!(request.on_failure, OnFailurePolicy::Rollback);
    }

    #[test]
    fn test_url_template_maps_to_template_url() {
        let template = ResolvedTemplate::Url("https://example.com/t.json".to_string());
        let request = build_create_stack(&options(), &template);

        assert!(request.template_body.is_none());
        assert_eq!(
            request.template_url.as_deref(),
            Some("https://example.com/t.json")
        );
    }

    #[test]
    fn test_populated_options_map_through() {
        let mut options = options();
        options.capabilities = vec!["CAPABILITY_IAM".to_string()];
        options.role_arn = Some("arn:aws:iam::123:role/deployer".to_string());
        options.parameter_overrides = Some(vec![
            Parameter::new("B", "2"),
            Parameter::new("A", "1"),
        ]);
        options.tags = vec![("team".to_string(), "platform".to_string())];
        options.notification_arn = Some("arn:aws:sns:eu-central-1:123:deploys".to_string());
        options.termination_protection = true;
        options.timeout_minutes = Some(30);

        let request = build_create_stack(&options, &body());

        assert_eq!(
            request.capabilities,
            Some(vec!["CAPABILITY_IAM".to_string()])
        );
        assert_eq!(
            request.role_arn.as_deref(),
            Some("arn:aws:iam::123:role/deployer")
        );
        // ordered list preserved
        assert_eq!(
            request.parameters,
            Some(vec![Parameter::new("B", "2"), Parameter::new("A", "1")])
        );
        assert_eq!(
            request.tags,
            Some(vec![("team".to_string(), "platform".to_string())])
        );
        assert_eq!(
            request.notification_arns,
            Some(vec!["arn:aws:sns:eu-central-1:123:deploys".to_string()])
        );
        assert_eq!(request.enable_termination_protection, Some(true));
        assert_eq!(request.timeout_in_minutes, Some(30));
    }

    #[test]
    fn test_change_set_request_shares_the_common_mapping() {
        let mut options = options();
        options.capabilities = vec!["CAPABILITY_NAMED_IAM".to_string()];
        options.parameter_overrides = Some(vec![Parameter::new("Environment", "test")]);
        options.notification_arn = Some("arn:aws:sns:eu-central-1:123:deploys".to_string());
        // create-only knobs must not leak into the change set request
        options.termination_protection = true;
        options.timeout_minutes = Some(30);

        let stack_request = build_create_stack(&options, &body());
        let change_set_request = build_change_set(&options, &body(), "demo-changeset");

        assert_eq!(change_set_request.stack_name, "demo");
        assert_eq!(change_set_request.change_set_name, "demo-changeset");
        assert_eq!(change_set_request.template_body, stack_request.template_body);
        assert_eq!(change_set_request.capabilities, stack_request.capabilities);
        assert_eq!(change_set_request.parameters, stack_request.parameters);
        assert_eq!(
            change_set_request.notification_arns,
            stack_request.notification_arns
        );
    }
}
