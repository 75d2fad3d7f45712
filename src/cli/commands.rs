use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Deploy CloudFormation stacks with change-set based updates
#[derive(Parser, Debug)]
#[command(
    name = "stackdeploy",
    about = "Deploy CloudFormation stacks with change-set based updates",
    version,
    author,
    long_about = "stackdeploy reconciles a named CloudFormation stack with a template: \
                  it creates the stack when it does not exist and stages a change set \
                  against it when it does, optionally waiting until the operation settles."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity (debug-level logging)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Create or update a stack from a template",
        long_about = "Creates the named stack when it does not exist, otherwise stages a \
                      change set against it and executes it.\n\n\
                      Examples:\n  \
                      stackdeploy deploy --stack-name demo --template-file stack.json\n  \
                      stackdeploy deploy --stack-name demo --template-url https://bucket.s3.amazonaws.com/stack.json --wait\n  \
                      stackdeploy deploy --stack-name demo --template-file stack.json \\\n      \
                      --parameter-overrides-file parameters.json --capability CAPABILITY_IAM"
    )]
    Deploy(DeployArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    #[arg(long, value_name = "NAME", help = "Name of the stack to create or update")]
    pub stack_name: String,

    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "template_url",
        help = "Path to the template file"
    )]
    pub template_file: Option<PathBuf>,

    #[arg(
        long,
        value_name = "URL",
        help = "Template URL fetched by the service (mutually exclusive with --template-file)"
    )]
    pub template_url: Option<String>,

    #[arg(
        long = "capability",
        value_name = "CAPABILITY",
        help = "Capability acknowledgement, e.g. CAPABILITY_IAM (repeatable)"
    )]
    pub capabilities: Vec<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "JSON file with [{\"ParameterKey\":...,\"ParameterValue\":...}] overrides"
    )]
    pub parameter_overrides_file: Option<PathBuf>,

    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON parameter overrides (the file takes precedence)"
    )]
    pub parameter_overrides: Option<String>,

    #[arg(
        long = "tag",
        value_name = "KEY=VALUE",
        value_parser = parse_key_val,
        help = "Stack tag (repeatable)"
    )]
    pub tags: Vec<(String, String)>,

    #[arg(long, value_name = "ARN", help = "Service role assumed by stack operations")]
    pub role_arn: Option<String>,

    #[arg(long, value_name = "ARN", help = "SNS topic notified of stack events")]
    pub notification_arn: Option<String>,

    #[arg(
        long,
        value_name = "MINUTES",
        help = "Stack creation timeout in minutes (create only)"
    )]
    pub timeout_minutes: Option<u32>,

    #[arg(long, help = "Block until the operation settles")]
    pub wait: bool,

    #[arg(long, help = "Execute the change set once it is ready (requires --wait)")]
    pub execute_change_set: bool,

    #[arg(long, help = "Roll back on creation failure instead of doing nothing")]
    pub enable_rollback: bool,

    #[arg(long, help = "Enable termination protection on the created stack")]
    pub termination_protection: bool,

    #[arg(long, help = "Delete a change set the service flagged FAILED")]
    pub delete_failed_change_sets: bool,

    #[arg(long, value_name = "REGION", help = "AWS region (falls back to AWS_REGION)")]
    pub region: Option<String>,

    #[arg(
        long,
        value_name = "URL",
        help = "Service endpoint override, e.g. http://localhost:4566"
    )]
    pub endpoint_url: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the result to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid tag '{}'. Expected KEY=VALUE", s))?;
    if key.is_empty() {
        return Err(format!("Invalid tag '{}'. Key must not be empty", s));
    }
    Ok((key.to_string(), value.to_string()))
}
