use super::logging_system::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "rollbar-log-bridge",
    version,
    about = "Error reporting bridge and deploy tracker"
)]
pub struct Cli {
    /// TOML configuration file; without it settings come from ROLLBAR_* variables
    #[arg(long, global = true, env = "ROLLBAR_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "LOG_LEVEL", value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Records a deployment of REVISION in the configured environment
    #[command(alias = "rollbar:deploy")]
    Deploy(DeployArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    /// Revision or version number being deployed
    pub revision: String,

    /// Deploy comment
    #[arg(short, long)]
    pub comment: Option<String>,

    /// Rollbar user who deployed
    #[arg(long, visible_alias = "ru")]
    pub rollbar_username: Option<String>,

    /// Local user who deployed
    #[arg(long, visible_alias = "lu")]
    pub local_username: Option<String>,
}
