pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DeployArgs};
pub use output::{OutputFormat, OutputFormatter};
