use crate::api::{ApiError, BuildApi, BuildResponse};
use crate::buffer::DeliveryBuffer;
use crate::config::BridgeConfig;
use crate::domain::{LogEvent, Severity};
use crate::exclusion::{ExclusionMatcher, KnownKinds};
use crate::notifier::{self, Notifier, NotifierConfig};
use crate::providers::Providers;
use crate::tracker::BuildTracker;
use crate::translator::ReportTranslator;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Log handler feeding the error tracker.
///
/// Events at or above the configured level are translated, filtered through
/// the exclusion list and queued on the notifier. Delivery happens on
/// [`flush`](Self::flush), on drop, or from the panic hook.
#[derive(Debug)]
pub struct ReportHandler {
    config: BridgeConfig,
    translator: ReportTranslator,
    buffer: DeliveryBuffer,
    tracker: BuildTracker,
}

impl ReportHandler {
    pub fn builder(config: BridgeConfig) -> ReportHandlerBuilder {
        ReportHandlerBuilder::new(config)
    }

    /// Handler backed by the process-wide HTTP notifier.
    pub fn from_config(config: BridgeConfig, providers: &Providers) -> Self {
        Self::builder(config).providers(providers.clone()).build()
    }

    pub fn with_notifier(config: BridgeConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::builder(config).notifier(notifier).build()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.buffer.is_configured()
    }

    pub fn is_handling(&self, severity: Severity) -> bool {
        severity >= self.config.level
    }

    pub fn has_pending_records(&self) -> bool {
        self.buffer.has_pending_records()
    }

    /// Processes one event. Returns `true` when the event is consumed and
    /// must not reach further handlers.
    pub fn handle(&self, event: &LogEvent) -> bool {
        if !self.is_handling(event.severity) {
            return false;
        }

        if self.buffer.is_configured() {
            match self.translator.translate(event) {
                Some(payload) => self.buffer.submit(payload),
                None => debug!(channel = %event.channel, "Event not reported"),
            }
        }

        !self.config.bubble
    }

    pub fn flush(&self) {
        self.buffer.flush();
    }

    pub fn close(&self) {
        self.buffer.close();
    }

    /// Sends a deploy notification for `revision` in the configured environment.
    pub async fn track_build(
        &self,
        revision: &str,
        comment: Option<&str>,
        rollbar_user: Option<&str>,
        local_user: Option<&str>,
    ) -> Result<Option<BuildResponse>, ApiError> {
        self.tracker
            .track_build(
                &self.config.rollbar.environment,
                revision,
                comment,
                rollbar_user,
                local_user,
            )
            .await
    }

    /// Browser reporter settings, ready to embed in a page.
    pub fn client_config(&self) -> Option<Value> {
        let client = &self.config.rollbar_js;
        if !self.config.enable || client.access_token.trim().is_empty() {
            return None;
        }
        Some(client.render(&self.config.rollbar.environment))
    }
}

/// Assembles a [`ReportHandler`] from explicit collaborators.
pub struct ReportHandlerBuilder {
    config: BridgeConfig,
    providers: Providers,
    known_kinds: KnownKinds,
    notifier: Option<Arc<dyn Notifier>>,
    build_api: Option<Arc<dyn BuildApi>>,
}

impl std::fmt::Debug for ReportHandlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportHandlerBuilder")
            .field("config", &self.config)
            .field("providers", &self.providers)
            .field("known_kinds", &self.known_kinds)
            .field("notifier", &self.notifier.is_some())
            .field("build_api", &self.build_api.is_some())
            .finish()
    }
}

impl ReportHandlerBuilder {
    fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            providers: Providers::new(),
            known_kinds: KnownKinds::permissive(),
            notifier: None,
            build_api: None,
        }
    }

    pub fn providers(mut self, providers: Providers) -> Self {
        self.providers = providers;
        self
    }

    pub fn known_kinds(mut self, known_kinds: KnownKinds) -> Self {
        self.known_kinds = known_kinds;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build_api(mut self, api: Arc<dyn BuildApi>) -> Self {
        self.build_api = Some(api);
        self
    }

    pub fn build(self) -> ReportHandler {
        let configured = self.config.is_configured();
        let exclusions = ExclusionMatcher::resolve(&self.config.exclude, &self.known_kinds);

        let buffer = if !configured {
            info!("Error reporting disabled or missing access token");
            DeliveryBuffer::unconfigured()
        } else if let Some(notifier) = self.notifier {
            DeliveryBuffer::new(notifier)
        } else {
            let notifier_config = NotifierConfig::resolve(&self.config.rollbar, &self.providers);
            match notifier::init(notifier_config) {
                Ok(notifier) => DeliveryBuffer::new(notifier),
                Err(e) => {
                    warn!("Failed to start notifier, reports will be dropped: {}", e);
                    DeliveryBuffer::unconfigured()
                }
            }
        };

        let tracker = match (configured, self.build_api) {
            (false, _) => BuildTracker::unconfigured(),
            (true, Some(api)) => BuildTracker::new(self.config.rollbar.access_token.clone(), api),
            (true, None) => BuildTracker::from_config(&self.config),
        };

        debug!(
            exclusions = exclusions.len(),
            level = %self.config.level,
            "Report handler ready"
        );

        ReportHandler {
            translator: ReportTranslator::new(exclusions),
            buffer,
            tracker,
            config: self.config,
        }
    }
}
