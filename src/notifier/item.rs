//! Item JSON as accepted by the `item/` endpoint.

use super::NotifierConfig;
use crate::domain::error_object::normalize_type_name;
use crate::domain::{ErrorObject, ReportPayload};
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const SCRUBBED: &str = "********";

/// Builds the request body for one report.
pub fn build_item(config: &NotifierConfig, payload: &ReportPayload) -> Value {
    let server = &config.server;

    let mut custom = server.custom.clone();
    custom.extend(payload.extra_fields.clone());
    custom.extend(payload.fragment.clone());

    let mut data = Map::new();
    data.insert("environment".into(), json!(server.environment));
    data.insert("level".into(), json!(payload.level.as_str()));
    data.insert("timestamp".into(), json!(Utc::now().timestamp()));
    data.insert("language".into(), json!("rust"));
    data.insert("platform".into(), json!(std::env::consts::OS));
    data.insert("uuid".into(), json!(Uuid::new_v4().to_string()));
    data.insert(
        "notifier".into(),
        json!({ "name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }),
    );
    if let Some(framework) = &server.framework {
        data.insert("framework".into(), json!(framework));
    }
    if !server.code_version.is_empty() {
        data.insert("code_version".into(), json!(server.code_version));
    }

    let mut host = Map::new();
    host.insert("branch".into(), json!(server.branch));
    if let Some(name) = &server.host {
        host.insert("host".into(), json!(name));
    }
    if let Some(root) = &server.root {
        host.insert("root".into(), json!(root.display().to_string()));
    }
    data.insert("server".into(), Value::Object(host));

    data.insert("body".into(), build_body(payload, server.capture_error_stacktraces));

    let person = config
        .person_provider
        .as_ref()
        .and_then(|provider| provider.person())
        .or_else(|| server.person.clone().filter(|p| !p.id.is_empty()));
    if let Some(person) = person {
        data.insert("person".into(), json!(person));
    }

    if !custom.is_empty() {
        data.insert("custom".into(), Value::Object(custom));
    }

    let mut data = Value::Object(data);
    scrub(&mut data, &server.scrub_fields, &server.scrub_whitelist);

    json!({ "access_token": server.access_token, "data": data })
}

fn build_body(payload: &ReportPayload, with_frames: bool) -> Value {
    match &payload.exception {
        Some(exception) => {
            let trace = build_trace(exception, with_frames);
            if exception.causes().is_empty() {
                json!({ "trace": trace })
            } else {
                let mut chain = vec![trace];
                chain.extend(exception.causes().iter().map(|cause| {
                    json!({
                        "frames": [],
                        "exception": { "class": "source", "message": cause },
                    })
                }));
                json!({ "trace_chain": chain })
            }
        }
        None => json!({
            "message": { "body": payload.message.clone().unwrap_or_default() }
        }),
    }
}

fn build_trace(exception: &ErrorObject, with_frames: bool) -> Value {
    let frames = match exception.trace() {
        Some(frames) if with_frames => json!(frames),
        _ => json!([]),
    };
    json!({
        "frames": frames,
        "exception": {
            "class": exception.type_name(),
            "message": exception.message(),
        },
    })
}

/// Replaces values of scrubbed keys (case-insensitive) anywhere in `value`.
pub fn scrub(value: &mut Value, fields: &[String], whitelist: &[String]) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map {
                let listed = fields.iter().any(|f| f.eq_ignore_ascii_case(key));
                let allowed = whitelist.iter().any(|w| w.eq_ignore_ascii_case(key));
                if listed && !allowed {
                    *entry = Value::from(SCRUBBED);
                } else {
                    scrub(entry, fields, whitelist);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                scrub(item, fields, whitelist);
            }
        }
        _ => {}
    }
}

/// Rate that applies to `payload`, if any.
///
/// Exceptions use the most specific exception rate whose name the error is
/// an instance of: an entry naming the exact type wins, then the entry with
/// the most path segments. Messages use the error rate keyed by level name.
pub fn sample_rate(
    payload: &ReportPayload,
    exception_rates: &BTreeMap<String, f64>,
    error_rates: &BTreeMap<String, f64>,
) -> Option<f64> {
    match &payload.exception {
        Some(exception) => exception_rates
            .iter()
            .filter(|(name, _)| exception.is_instance_of(name))
            .max_by_key(|(name, _)| specificity(exception, name))
            .map(|(_, rate)| *rate),
        None => error_rates.get(payload.level.as_str()).copied(),
    }
}

fn specificity(exception: &ErrorObject, entry: &str) -> (bool, usize) {
    let entry = normalize_type_name(entry);
    (entry == exception.type_name(), entry.split("::").count())
}
