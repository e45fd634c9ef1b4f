use super::error_object::ErrorObject;
use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A log record produced by the host application.
///
/// The pipeline only ever borrows events; nothing downstream mutates them.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub severity: Severity,
    pub message: String,
    pub channel: String,
    pub timestamp: DateTime<Utc>,
    pub context: Map<String, Value>,
    pub extra: Map<String, Value>,
    pub exception: Option<ErrorObject>,
}

impl LogEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            channel: "app".to_string(),
            timestamp: Utc::now(),
            context: Map::new(),
            extra: Map::new(),
            exception: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_exception(mut self, exception: ErrorObject) -> Self {
        self.exception = Some(exception);
        self
    }
}
