use crate::api::{ApiError, BuildApi, BuildPayload, BuildResponse, HttpApiClient};
use crate::config::BridgeConfig;
use crate::filter::{COMMENT_MAX_LENGTH, DEFAULT_MAX_LENGTH, truncate};
use std::sync::Arc;
use tracing::{info, warn};

/// Records deployments. Independent of the log buffer.
#[derive(Clone, Default)]
pub struct BuildTracker {
    target: Option<(String, Arc<dyn BuildApi>)>,
}

impl BuildTracker {
    pub fn new(access_token: impl Into<String>, api: Arc<dyn BuildApi>) -> Self {
        Self {
            target: Some((access_token.into(), api)),
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Tracker backed by the HTTP deploy client, or unconfigured when the
    /// bridge is disabled or the client cannot be built.
    pub fn from_config(config: &BridgeConfig) -> Self {
        if !config.is_configured() {
            return Self::unconfigured();
        }
        let server = &config.rollbar;
        match HttpApiClient::new(
            &server.api_base(),
            server.request_timeout(),
            server.proxy.as_deref(),
        ) {
            Ok(client) => Self::new(server.access_token.clone(), Arc::new(client)),
            Err(e) => {
                warn!("Deploy tracking disabled: {}", e);
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    /// Payload with every field cut to the backend's column limits.
    pub fn build_payload(
        &self,
        environment: &str,
        revision: &str,
        comment: Option<&str>,
        rollbar_user: Option<&str>,
        local_user: Option<&str>,
    ) -> Option<BuildPayload> {
        let (access_token, _) = self.target.as_ref()?;
        Some(BuildPayload {
            access_token: access_token.clone(),
            environment: truncate(Some(environment), DEFAULT_MAX_LENGTH),
            revision: truncate(Some(revision), DEFAULT_MAX_LENGTH),
            comment: truncate(comment, COMMENT_MAX_LENGTH),
            rollbar_username: truncate(rollbar_user, DEFAULT_MAX_LENGTH),
            local_username: truncate(local_user, DEFAULT_MAX_LENGTH),
        })
    }

    /// Sends one deploy notification; `Ok(None)` when unconfigured.
    pub async fn track_build(
        &self,
        environment: &str,
        revision: &str,
        comment: Option<&str>,
        rollbar_user: Option<&str>,
        local_user: Option<&str>,
    ) -> Result<Option<BuildResponse>, ApiError> {
        let Some((_, api)) = &self.target else {
            return Ok(None);
        };
        let Some(payload) =
            self.build_payload(environment, revision, comment, rollbar_user, local_user)
        else {
            return Ok(None);
        };

        let response = api.track_build(&payload).await?;
        info!(
            environment = %payload.environment,
            revision = %payload.revision,
            status = response.status,
            "Deploy tracked"
        );
        Ok(Some(response))
    }
}

impl std::fmt::Debug for BuildTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildTracker")
            .field("configured", &self.is_configured())
            .finish()
    }
}
