//! Shared helpers for integration tests

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::NamedTempFile;

use stackdeploy::deploy::{DeployOptions, StackReconciler};
use stackdeploy::gateway::{MockGateway, StackGateway};
use stackdeploy::template::TemplateSource;

/// A minimal template body used across tests
pub const TEMPLATE_BODY: &str =
    r#"{"Parameters": {"Environment": {"Type": "String"}}, "Resources": {}}"#;

/// Writes a template file that lives as long as the returned handle.
pub fn template_file() -> (NamedTempFile, PathBuf) {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", TEMPLATE_BODY).unwrap();
    let path = file.path().to_path_buf();
    (file, path)
}

/// Default options against a template URL (no filesystem involved).
pub fn url_options(stack_name: &str) -> DeployOptions {
    DeployOptions::new(
        stack_name,
        TemplateSource::Url("https://example.com/template.json".to_string()),
    )
}

pub fn reconciler(options: DeployOptions, gateway: &Arc<MockGateway>) -> StackReconciler {
    StackReconciler::new(options, Arc::clone(gateway) as Arc<dyn StackGateway>)
}
