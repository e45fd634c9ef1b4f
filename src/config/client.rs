use super::server::default_scrub_fields;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JS_UNCAUGHT_LEVEL: &str = "error";
pub const JS_ITEMS_PER_MINUTE: u32 = 60;
pub const JS_MAX_ITEMS: u32 = 0;

/// Browser-side reporter settings.
///
/// The bridge never reports from the browser itself; this group is parsed,
/// validated and rendered so a web layer can embed it in pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub access_token: String,
    pub payload: Map<String, Value>,
    pub enabled: bool,
    pub capture_uncaught: bool,
    pub uncaught_error_level: String,
    pub capture_unhandled_rejections: bool,
    pub ignored_messages: Vec<String>,
    pub verbose: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub auto_instrument: AutoInstrument,
    pub items_per_minute: u32,
    pub max_items: u32,
    pub scrub_fields: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            payload: Map::new(),
            enabled: true,
            capture_uncaught: true,
            uncaught_error_level: JS_UNCAUGHT_LEVEL.to_string(),
            capture_unhandled_rejections: true,
            ignored_messages: Vec::new(),
            verbose: false,
            is_async: true,
            auto_instrument: AutoInstrument::default(),
            items_per_minute: JS_ITEMS_PER_MINUTE,
            max_items: JS_MAX_ITEMS,
            scrub_fields: default_scrub_fields(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoInstrument {
    pub network: bool,
    pub log: bool,
    pub dom: bool,
    pub navigation: bool,
    pub connectivity: bool,
}

impl Default for AutoInstrument {
    fn default() -> Self {
        Self {
            network: true,
            log: true,
            dom: true,
            navigation: true,
            connectivity: true,
        }
    }
}

impl ClientConfig {
    /// JSON object for the browser snippet; `environment` defaults to the server's.
    pub fn render(&self, environment: &str) -> Value {
        let mut config = self.clone();
        config
            .payload
            .entry("environment")
            .or_insert_with(|| Value::from(environment));
        serde_json::to_value(config).unwrap_or(Value::Null)
    }
}
