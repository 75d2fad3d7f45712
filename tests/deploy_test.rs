//! Integration tests for the deploy flow using the scripted mock gateway
//!
//! These verify the reconciliation behavior end-to-end without a remote
//! service: which requests a deploy issues, in which order, and what the
//! caller gets back.

mod support;

use std::sync::Arc;

use stackdeploy::deploy::{DeployError, DeployOptions};
use stackdeploy::gateway::{
    ChangeSetStatus, ExecutionStatus, GatewayError, MockGateway, MockOutcome, OperationAck,
};
use stackdeploy::params::{parameter_overrides, Parameter};
use stackdeploy::template::TemplateSource;

use support::{reconciler, template_file, url_options};

#[tokio::test]
async fn deploy_of_missing_stack_creates_and_never_stages_a_change_set() {
    let gateway = Arc::new(MockGateway::new());
    gateway.enqueue(
        "describe_stack",
        MockOutcome::Error(GatewayError::NotFound(
            "Stack with id demo does not exist".to_string(),
        )),
    );
    gateway.enqueue(
        "create_stack",
        MockOutcome::Ack(OperationAck::ok(Some(
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1".to_string(),
        ))),
    );

    let result = reconciler(url_options("demo"), &gateway)
        .deploy()
        .await
        .unwrap();

    assert_eq!(result.status, "200");
    assert!(result.stack_id.unwrap().contains("demo"));
    assert_eq!(
        gateway.called_operations(),
        vec!["describe_stack", "create_stack"]
    );
    assert_eq!(gateway.call_count("create_change_set"), 0);
}

#[tokio::test]
async fn deploy_of_existing_stack_stages_a_change_set_and_never_creates() {
    let gateway = Arc::new(MockGateway::new());
    gateway.enqueue(
        "describe_stack",
        MockOutcome::Stack(MockGateway::snapshot(
            "demo",
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1",
            "CREATE_COMPLETE",
        )),
    );
    gateway.enqueue(
        "create_change_set",
        MockOutcome::Ack(OperationAck::ok(Some(
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1".to_string(),
        ))),
    );

    let result = reconciler(url_options("demo"), &gateway)
        .deploy()
        .await
        .unwrap();

    assert_eq!(result.status, "200");
    assert_eq!(gateway.call_count("create_stack"), 0);
    assert_eq!(gateway.call_count("create_change_set"), 1);

    // the change set name derives from the stack name
    let calls = gateway.calls();
    let (_, args) = calls
        .iter()
        .find(|(operation, _)| operation == "create_change_set")
        .unwrap();
    assert_eq!(args, &vec!["demo".to_string(), "demo-changeset".to_string()]);
}

#[tokio::test]
async fn redeploying_an_unchanged_template_is_not_an_error() {
    // Second deploy of the same template: the service auto-resolves the
    // zero-change set, the deploy reports success.
    let gateway = Arc::new(MockGateway::new());
    gateway.enqueue(
        "describe_stack",
        MockOutcome::Stack(MockGateway::snapshot(
            "demo",
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1",
            "UPDATE_COMPLETE",
        )),
    );
    gateway.enqueue(
        "create_change_set",
        MockOutcome::Ack(OperationAck::ok(Some(
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1".to_string(),
        ))),
    );
    gateway.enqueue(
        "wait_for_change_set",
        MockOutcome::ChangeSet(MockGateway::change_set(
            ChangeSetStatus::CreateComplete,
            ExecutionStatus::ExecuteComplete,
            None,
        )),
    );

    let mut options = url_options("demo");
    options.wait_for_completion = true;

    let result = reconciler(options, &gateway).deploy().await.unwrap();

    assert!(result.is_success());
    assert_eq!(gateway.call_count("execute_change_set"), 0);
}

#[tokio::test]
async fn execute_without_wait_only_submits_the_change_set() {
    let gateway = Arc::new(MockGateway::new());
    gateway.enqueue(
        "describe_stack",
        MockOutcome::Stack(MockGateway::snapshot(
            "demo",
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1",
            "CREATE_COMPLETE",
        )),
    );
    gateway.enqueue(
        "create_change_set",
        MockOutcome::Ack(OperationAck::ok(Some(
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1".to_string(),
        ))),
    );

    let mut options = url_options("demo");
    options.wait_for_completion = false;
    options.execute_change_set = true;

    let result = reconciler(options, &gateway).deploy().await.unwrap();

    assert!(result.is_success());
    // submission only: no wait, no execution
    assert_eq!(gateway.call_count("wait_for_change_set"), 0);
    assert_eq!(gateway.call_count("execute_change_set"), 0);
}

#[tokio::test]
async fn failed_change_set_is_deleted_and_the_failure_still_surfaces() {
    let gateway = Arc::new(MockGateway::new());
    gateway.enqueue(
        "describe_stack",
        MockOutcome::Stack(MockGateway::snapshot(
            "demo",
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1",
            "CREATE_COMPLETE",
        )),
    );
    gateway.enqueue(
        "create_change_set",
        MockOutcome::Ack(OperationAck::ok(Some(
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1".to_string(),
        ))),
    );
    gateway.enqueue(
        "wait_for_change_set",
        MockOutcome::Error(GatewayError::ChangeSetFailed {
            status: "FAILED".to_string(),
            reason: Some("Transform failed".to_string()),
        }),
    );
    gateway.enqueue(
        "describe_change_set",
        MockOutcome::ChangeSet(MockGateway::change_set(
            ChangeSetStatus::Failed,
            ExecutionStatus::Unavailable,
            Some("Transform failed"),
        )),
    );
    gateway.enqueue("delete_change_set", MockOutcome::Unit);

    let mut options = url_options("demo");
    options.wait_for_completion = true;
    options.delete_failed_change_sets = true;

    let err = reconciler(options, &gateway).deploy().await.unwrap_err();

    assert!(matches!(
        err,
        DeployError::Gateway(GatewayError::ChangeSetFailed { .. })
    ));

    // the delete happened before the failure was re-raised
    let operations = gateway.called_operations();
    let delete_position = operations
        .iter()
        .position(|operation| operation == "delete_change_set");
    assert!(delete_position.is_some());
}

#[tokio::test]
async fn full_update_executes_a_ready_change_set() {
    let gateway = Arc::new(MockGateway::new());
    gateway.enqueue(
        "describe_stack",
        MockOutcome::Stack(MockGateway::snapshot(
            "demo",
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1",
            "CREATE_COMPLETE",
        )),
    );
    gateway.enqueue(
        "create_change_set",
        MockOutcome::Ack(OperationAck::ok(Some(
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1".to_string(),
        ))),
    );
    gateway.enqueue(
        "wait_for_change_set",
        MockOutcome::ChangeSet(MockGateway::change_set(
            ChangeSetStatus::CreateComplete,
            ExecutionStatus::Available,
            None,
        )),
    );
    gateway.enqueue(
        "execute_change_set",
        MockOutcome::Ack(OperationAck::ok(None)),
    );
    gateway.enqueue(
        "wait_for_stack",
        MockOutcome::Stack(MockGateway::snapshot(
            "demo",
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1",
            "UPDATE_COMPLETE",
        )),
    );

    let mut options = url_options("demo");
    options.wait_for_completion = true;
    options.parameter_overrides = Some(vec![Parameter::new("Environment", "test")]);

    let result = reconciler(options, &gateway).deploy().await.unwrap();

    assert_eq!(result.status, "200");
    assert_eq!(
        gateway.called_operations(),
        vec![
            "describe_stack",
            "create_change_set",
            "wait_for_change_set",
            "execute_change_set",
            "wait_for_stack",
        ]
    );
}

#[tokio::test]
async fn deploy_reads_the_template_file_before_any_remote_call() {
    let gateway = Arc::new(MockGateway::new());
    gateway.enqueue(
        "describe_stack",
        MockOutcome::Error(GatewayError::NotFound("demo".to_string())),
    );

    let options = DeployOptions::new(
        "demo",
        TemplateSource::File("/nonexistent/template.json".into()),
    );

    let err = reconciler(options, &gateway).deploy().await.unwrap_err();

    assert!(matches!(err, DeployError::Template(_)));
    // only the initial describe went out; nothing was submitted
    assert_eq!(gateway.called_operations(), vec!["describe_stack"]);
}

#[tokio::test]
async fn deploy_with_template_file_sends_its_contents() {
    let (_file, path) = template_file();

    let gateway = Arc::new(MockGateway::new());
    gateway.enqueue(
        "describe_stack",
        MockOutcome::Error(GatewayError::NotFound("demo".to_string())),
    );
    gateway.enqueue(
        "create_stack",
        MockOutcome::Ack(OperationAck::ok(Some(
            "arn:aws:cloudformation:eu-central-1:123:stack/demo/1".to_string(),
        ))),
    );

    let options = DeployOptions::new("demo", TemplateSource::File(path));
    let result = reconciler(options, &gateway).deploy().await.unwrap();

    assert!(result.is_success());
    assert_eq!(gateway.call_count("create_stack"), 1);
}

#[tokio::test]
async fn missing_stack_name_is_rejected_before_any_remote_call() {
    let gateway = Arc::new(MockGateway::new());

    let err = reconciler(url_options(""), &gateway).deploy().await.unwrap_err();

    assert!(matches!(err, DeployError::Config(_)));
    assert!(gateway.calls().is_empty());
}

#[test]
fn template_source_requires_exactly_one_variant() {
    assert!(TemplateSource::from_parts(None, None).is_err());
    assert!(TemplateSource::from_parts(
        Some("stack.json".into()),
        Some("https://example.com/t.json".to_string())
    )
    .is_err());
}

#[test]
fn parameter_overrides_from_file_and_inline() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"ParameterKey":"Environment","ParameterValue":"test"}}]"#
    )
    .unwrap();

    // file alone
    let overrides = parameter_overrides(Some(file.path()), None).unwrap();
    assert_eq!(overrides, Some(vec![Parameter::new("Environment", "test")]));

    // inline alone
    let inline = r#"[{"ParameterKey":"Environment","ParameterValue":"dev"}]"#;
    let overrides = parameter_overrides(None, Some(inline)).unwrap();
    assert_eq!(overrides, Some(vec![Parameter::new("Environment", "dev")]));

    // both: the file wins
    let overrides = parameter_overrides(Some(file.path()), Some(inline)).unwrap();
    assert_eq!(overrides, Some(vec![Parameter::new("Environment", "test")]));
}
