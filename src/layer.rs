//! `tracing` integration: events become [`LogEvent`]s for a [`ReportHandler`].

use crate::domain::{ErrorObject, LogEvent, Severity};
use crate::handler::ReportHandler;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Field naming one of the eight severities, overriding the event level.
pub const SEVERITY_FIELD: &str = "severity";
/// Field carrying the type name of an error recorded on the same event.
pub const EXCEPTION_TYPE_FIELD: &str = "exception_type";

const DEFAULT_EXCEPTION_TYPE: &str = "Error";

// Events from the bridge and its transport would report themselves.
const IGNORED_TARGETS: &[&str] = &[
    "rollbar_log_bridge",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
];

pub struct ReportLayer {
    handler: Arc<ReportHandler>,
}

impl ReportLayer {
    /// Returns the layer and a guard that flushes pending reports on drop.
    ///
    /// A global subscriber is never dropped, so the handler inside it never
    /// flushes on its own. Keep the guard alive in `main` until exit:
    ///
    /// ```no_run
    /// # use rollbar_log_bridge::{BridgeConfig, Providers, ReportHandler, ReportLayer};
    /// # use std::sync::Arc;
    /// # use tracing_subscriber::prelude::*;
    /// let handler = Arc::new(ReportHandler::from_config(BridgeConfig::default(), &Providers::new()));
    /// let (layer, _flush_guard) = ReportLayer::new(handler);
    /// tracing_subscriber::registry().with(layer).init();
    /// ```
    pub fn new(handler: Arc<ReportHandler>) -> (Self, FlushGuard) {
        let guard = FlushGuard {
            handler: handler.clone(),
        };
        (Self { handler }, guard)
    }

    pub fn handler(&self) -> &Arc<ReportHandler> {
        &self.handler
    }
}

/// Closes the handler when dropped.
#[must_use = "dropping the guard flushes immediately; hold it until shutdown"]
pub struct FlushGuard {
    handler: Arc<ReportHandler>,
}

impl FlushGuard {
    pub fn handler(&self) -> &Arc<ReportHandler> {
        &self.handler
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.handler.close();
    }
}

impl std::fmt::Debug for FlushGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushGuard")
            .field("has_pending_records", &self.handler.has_pending_records())
            .finish()
    }
}

/// Severity for a `tracing` level; TRACE has no counterpart and maps to DEBUG.
pub fn severity_for(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warning,
        Level::INFO => Severity::Info,
        _ => Severity::Debug,
    }
}

fn is_ignored_target(target: &str) -> bool {
    IGNORED_TARGETS.iter().any(|ignored| {
        target == *ignored
            || target
                .strip_prefix(ignored)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    severity: Option<String>,
    exception_type: Option<String>,
    error: Option<(String, Vec<String>)>,
    fields: Map<String, Value>,
}

impl EventVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => {
                self.message = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            SEVERITY_FIELD => self.severity = value.as_str().map(str::to_string),
            EXCEPTION_TYPE_FIELD => self.exception_type = value.as_str().map(str::to_string),
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }

    fn exception(&mut self) -> Option<ErrorObject> {
        let (message, causes) = self.error.take()?;
        let type_name = self
            .exception_type
            .take()
            .unwrap_or_else(|| DEFAULT_EXCEPTION_TYPE.to_string());
        Some(ErrorObject::new(type_name, message).with_causes(causes))
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, json!(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, json!(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, json!(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, json!(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        let mut causes = Vec::new();
        let mut source = value.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        if self.error.is_none() {
            self.error = Some((value.to_string(), causes));
        } else {
            self.fields
                .insert(field.name().to_string(), json!(value.to_string()));
        }
    }
}

impl<S: Subscriber> Layer<S> for ReportLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_ignored_target(metadata.target()) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let severity = visitor
            .severity
            .as_deref()
            .and_then(|name| Severity::from_name(name).ok())
            .unwrap_or_else(|| severity_for(metadata.level()));
        if !self.handler.is_handling(severity) {
            return;
        }

        let exception = visitor.exception();
        let message = visitor
            .message
            .take()
            .unwrap_or_else(|| metadata.name().to_string());

        let mut log_event = LogEvent::new(severity, message).with_channel(metadata.target());
        log_event.context = std::mem::take(&mut visitor.fields);
        if let Some(exception) = exception {
            log_event = log_event.with_exception(exception);
        }

        self.handler.handle(&log_event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_for_levels() {
        assert_eq!(severity_for(&Level::ERROR), Severity::Error);
        assert_eq!(severity_for(&Level::WARN), Severity::Warning);
        assert_eq!(severity_for(&Level::INFO), Severity::Info);
        assert_eq!(severity_for(&Level::DEBUG), Severity::Debug);
        assert_eq!(severity_for(&Level::TRACE), Severity::Debug);
    }

    #[test]
    fn test_ignored_targets() {
        assert!(is_ignored_target("rollbar_log_bridge"));
        assert!(is_ignored_target("rollbar_log_bridge::notifier::http"));
        assert!(is_ignored_target("hyper_util::client"));
        assert!(!is_ignored_target("hyperion"));
        assert!(!is_ignored_target("billing::invoices"));
    }
}
