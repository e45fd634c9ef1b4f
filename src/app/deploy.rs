use super::cli::DeployArgs;
use crate::tracker::BuildTracker;
use std::io::Write;
use tracing::warn;

/// Outcome of one `deploy` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Tracked,
    NotTracked(String),
}

impl DeployOutcome {
    pub fn is_tracked(&self) -> bool {
        matches!(self, DeployOutcome::Tracked)
    }
}

pub async fn track(tracker: &BuildTracker, environment: &str, args: &DeployArgs) -> DeployOutcome {
    let result = tracker
        .track_build(
            environment,
            &args.revision,
            args.comment.as_deref(),
            args.rollbar_username.as_deref(),
            args.local_username.as_deref(),
        )
        .await;

    match result {
        Ok(Some(response)) if response.is_success() => DeployOutcome::Tracked,
        Ok(Some(response)) => {
            warn!(status = response.status, "Deploy rejected");
            let reason = if response.body.trim().is_empty() {
                format!("HTTP {}", response.status)
            } else {
                response.body
            };
            DeployOutcome::NotTracked(reason)
        }
        Ok(None) => DeployOutcome::NotTracked("error reporting is not configured".to_string()),
        Err(e) => DeployOutcome::NotTracked(e.to_string()),
    }
}

/// Tracks the deploy and prints the result line to `out`.
pub async fn run_deploy<W: Write>(
    tracker: &BuildTracker,
    environment: &str,
    args: &DeployArgs,
    out: &mut W,
) -> std::io::Result<DeployOutcome> {
    let outcome = track(tracker, environment, args).await;
    match &outcome {
        DeployOutcome::Tracked => writeln!(out, "Done.")?,
        DeployOutcome::NotTracked(reason) => {
            writeln!(out, "Build has been not tracked: {}", reason)?;
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_tracker_reports_reason() {
        let args = DeployArgs {
            revision: "R1".to_string(),
            comment: None,
            rollbar_username: None,
            local_username: None,
        };
        let mut out = Vec::new();
        let outcome = tokio_test::block_on(run_deploy(
            &BuildTracker::unconfigured(),
            "production",
            &args,
            &mut out,
        ))
        .unwrap();

        assert!(!outcome.is_tracked());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Build has been not tracked: error reporting is not configured\n"
        );
    }
}
