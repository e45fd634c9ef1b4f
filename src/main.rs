use rollbar_log_bridge::app;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    app::main().await
}
