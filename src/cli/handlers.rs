//! Deploy command handler
//!
//! Adapts parsed CLI arguments into the deploy core: loads configuration,
//! resolves the template source and parameter overrides, constructs the
//! gateway, runs the reconciler, and renders the result. Returns the process
//! exit code.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::cli::commands::DeployArgs;
use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::config::ClientConfig;
use crate::deploy::{DeployOptions, ReconcileResult, StackReconciler};
use crate::gateway::{CloudFormationGateway, StackGateway};
use crate::params;
use crate::template::TemplateSource;

pub async fn handle_deploy(args: &DeployArgs, quiet: bool) -> i32 {
    info!("Starting stack deployment");

    let result = match run_deploy(args).await {
        Ok(result) => result,
        Err(err) => {
            error!("Deployment failed: {:#}", err);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    if let Err(err) = formatter.emit(&result, args.output.as_deref()) {
        error!("Failed to write output: {}", err);
        return 1;
    }

    if result.is_success() {
        if !quiet {
            info!(
                stack_id = result.stack_id.as_deref().unwrap_or("<unknown>"),
                "Deployment succeeded"
            );
        }
        0
    } else {
        error!(status = %result.status, "Deployment did not succeed");
        1
    }
}

async fn run_deploy(args: &DeployArgs) -> Result<ReconcileResult> {
    let template =
        TemplateSource::from_parts(args.template_file.clone(), args.template_url.clone())
            .context("pass exactly one of --template-file or --template-url")?;

    let parameter_overrides = params::parameter_overrides(
        args.parameter_overrides_file.as_deref(),
        args.parameter_overrides.as_deref(),
    )
    .context("failed to load parameter overrides")?;

    let mut client_config = ClientConfig::from_env();
    if let Some(region) = &args.region {
        client_config.region = region.clone();
    }
    if let Some(endpoint) = &args.endpoint_url {
        client_config.endpoint = Some(endpoint.clone());
    }
    client_config
        .validate()
        .context("check your environment variables and command-line arguments")?;

    let mut options = DeployOptions::new(args.stack_name.clone(), template);
    options.capabilities = args.capabilities.clone();
    options.timeout_minutes = args.timeout_minutes;
    options.wait_for_completion = args.wait;
    options.execute_change_set = args.execute_change_set;
    options.enable_rollback = args.enable_rollback;
    options.termination_protection = args.termination_protection;
    options.role_arn = args.role_arn.clone();
    options.tags = args.tags.clone();
    options.notification_arn = args.notification_arn.clone();
    options.parameter_overrides = parameter_overrides;
    options.delete_failed_change_sets = args.delete_failed_change_sets;

    debug!(
        stack = %options.stack_name,
        region = %client_config.region,
        "resolved configuration"
    );

    let gateway = CloudFormationGateway::connect(&client_config).await;
    let reconciler = StackReconciler::new(options, Arc::new(gateway) as Arc<dyn StackGateway>);

    let result = reconciler.deploy().await?;
    Ok(result)
}
