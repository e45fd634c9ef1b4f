use crate::domain::{LogEvent, ReportPayload, map_level};
use crate::exclusion::ExclusionMatcher;
use serde_json::{Map, Value};
use tracing::debug;

/// Context key carrying a pre-built payload fragment.
pub const PAYLOAD_KEY: &str = "payload";

/// Turns log events into report payloads.
#[derive(Debug, Clone, Default)]
pub struct ReportTranslator {
    exclusions: ExclusionMatcher,
}

impl ReportTranslator {
    pub fn new(exclusions: ExclusionMatcher) -> Self {
        Self { exclusions }
    }

    /// Returns `None` when the event carries an excluded error.
    pub fn translate(&self, event: &LogEvent) -> Option<ReportPayload> {
        let mut context = event.context.clone();
        let mut fragment = match context.remove(PAYLOAD_KEY) {
            Some(Value::Object(fragment)) => fragment,
            Some(other) => {
                // Not an object: keep it visible as a plain field.
                context.insert(PAYLOAD_KEY.to_string(), other);
                Map::new()
            }
            None => Map::new(),
        };

        let level = map_level(event.severity);
        let mut fields = context;
        fields.extend(event.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields.insert("level".to_string(), Value::from(level.as_str()));
        fields.insert(
            "monolog_level".to_string(),
            Value::from(event.severity.name()),
        );
        fields.insert("channel".to_string(), Value::from(event.channel.as_str()));
        fields.insert(
            "datetime".to_string(),
            Value::from(event.timestamp.timestamp()),
        );

        match &event.exception {
            Some(exception) => {
                fragment.insert("level".to_string(), Value::from(level.as_str()));
                if self.exclusions.should_skip(Some(exception)) {
                    debug!(
                        error_type = exception.type_name(),
                        "Dropping excluded error report"
                    );
                    return None;
                }
                Some(ReportPayload::exception(exception.clone(), fields, fragment))
            }
            None => Some(ReportPayload::message(
                level,
                event.message.clone(),
                fields,
                fragment,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorObject, Level, Severity};
    use crate::exclusion::{ExclusionList, KnownKinds};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn translator(exclude: &[&str]) -> ReportTranslator {
        ReportTranslator::new(ExclusionMatcher::resolve(
            &ExclusionList::new(exclude.iter().copied()),
            &KnownKinds::permissive(),
        ))
    }

    #[test]
    fn test_message_event() {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = LogEvent::new(Severity::Error, "disk full")
            .with_channel("storage")
            .with_timestamp(timestamp)
            .with_context("volume", "/var");

        let payload = translator(&[]).translate(&event).unwrap();

        assert_eq!(payload.level, Level::Error);
        assert_eq!(payload.message.as_deref(), Some("disk full"));
        assert!(payload.exception.is_none());
        assert_eq!(payload.extra_fields["volume"], json!("/var"));
        assert_eq!(payload.extra_fields["level"], json!("error"));
        assert_eq!(payload.extra_fields["monolog_level"], json!("ERROR"));
        assert_eq!(payload.extra_fields["channel"], json!("storage"));
        assert_eq!(
            payload.extra_fields["datetime"],
            json!(timestamp.timestamp())
        );
        assert!(payload.fragment.is_empty());
    }

    #[test]
    fn test_extra_overrides_context() {
        let event = LogEvent::new(Severity::Warning, "slow")
            .with_context("request_id", "ctx")
            .with_extra("request_id", "extra");

        let payload = translator(&[]).translate(&event).unwrap();
        assert_eq!(payload.level, Level::Warning);
        assert_eq!(payload.extra_fields["request_id"], json!("extra"));
    }

    #[test]
    fn test_payload_fragment_is_extracted() {
        let event = LogEvent::new(Severity::Info, "hello")
            .with_context("payload", json!({"fingerprint": "abc"}));

        let payload = translator(&[]).translate(&event).unwrap();
        assert_eq!(payload.fragment["fingerprint"], json!("abc"));
        assert!(!payload.extra_fields.contains_key("payload"));
    }

    #[test]
    fn test_exception_is_reported_at_error_level() {
        let event = LogEvent::new(Severity::Warning, "ignored message")
            .with_exception(ErrorObject::new("app::Timeout", "took too long"));

        let payload = translator(&[]).translate(&event).unwrap();
        assert_eq!(payload.level, Level::Error);
        assert!(payload.message.is_none());
        assert_eq!(payload.fragment["level"], json!("warning"));
        assert_eq!(
            payload.exception.as_ref().map(ErrorObject::type_name),
            Some("app::Timeout")
        );
    }

    #[test]
    fn test_excluded_exception_is_dropped() {
        let event = LogEvent::new(Severity::Critical, "boom")
            .with_exception(ErrorObject::new("app::Timeout", "took too long"));

        assert!(translator(&["app::Timeout"]).translate(&event).is_none());
    }
}
