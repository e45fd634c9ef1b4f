//! Command-line entry point.

pub mod cli;
pub mod deploy;
pub mod logging_system;

pub use cli::{Cli, Command, DeployArgs};
pub use deploy::{DeployOutcome, run_deploy};
pub use logging_system::{LogLevel, LoggingError, setup_logging};

use crate::config::BridgeConfig;
use crate::tracker::BuildTracker;
use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

pub async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    run(cli).await
}

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Err(e) = setup_logging(cli.log_level) {
        eprintln!("Warning: {}", e);
    }

    let config = BridgeConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration from environment".to_string(),
    })?;
    debug!(
        environment = %config.rollbar.environment,
        configured = config.is_configured(),
        "Configuration loaded"
    );

    match cli.command {
        Command::Deploy(args) => {
            let tracker = BuildTracker::from_config(&config);
            let mut stdout = std::io::stdout();
            let outcome =
                run_deploy(&tracker, &config.rollbar.environment, &args, &mut stdout).await?;
            Ok(if outcome.is_tracked() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
