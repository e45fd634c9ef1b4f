use super::error_object::ErrorObject;
use super::severity::Level;
use serde_json::{Map, Value};

/// A normalised report ready for the notifier.
///
/// `fragment` is the raw payload base supplied by the caller through
/// `context["payload"]`; `extra_fields` holds the merged context and derived
/// fields (`level`, `monolog_level`, `channel`, `datetime`).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPayload {
    pub level: Level,
    pub message: Option<String>,
    pub exception: Option<ErrorObject>,
    pub extra_fields: Map<String, Value>,
    pub fragment: Map<String, Value>,
}

impl ReportPayload {
    pub fn message(
        level: Level,
        message: impl Into<String>,
        extra_fields: Map<String, Value>,
        fragment: Map<String, Value>,
    ) -> Self {
        Self {
            level,
            message: Some(message.into()),
            exception: None,
            extra_fields,
            fragment,
        }
    }

    /// Exception reports are always raised at `Level::Error`.
    pub fn exception(
        exception: ErrorObject,
        extra_fields: Map<String, Value>,
        fragment: Map<String, Value>,
    ) -> Self {
        Self {
            level: Level::Error,
            message: None,
            exception: Some(exception),
            extra_fields,
            fragment,
        }
    }

    pub fn is_exception(&self) -> bool {
        self.exception.is_some()
    }
}
