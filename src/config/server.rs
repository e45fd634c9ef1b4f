use super::serde_helpers::SampleRate;
use crate::providers::Person;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const API_ENDPOINT: &str = "https://api.rollbar.com/api/1/";
pub const BRANCH: &str = "master";
pub const DEFAULT_ENVIRONMENT: &str = "production";

pub fn default_scrub_fields() -> Vec<String> {
    [
        "passwd",
        "password",
        "secret",
        "confirm_password",
        "password_confirmation",
        "auth_token",
        "csrf_token",
        "access_token",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Server-side notifier settings (`[rollbar]` group).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub access_token: String,
    pub endpoint: String,
    /// Older name for `endpoint`; used only when `endpoint` is empty.
    pub base_api_url: String,
    pub environment: String,
    pub branch: String,
    pub code_version: String,
    pub host: Option<String>,
    pub root: Option<PathBuf>,
    pub framework: Option<String>,
    pub capture_error_stacktraces: bool,
    pub scrub_fields: Vec<String>,
    pub scrub_whitelist: Vec<String>,
    pub exception_sample_rates: BTreeMap<String, SampleRate>,
    pub error_sample_rates: BTreeMap<String, SampleRate>,
    pub proxy: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// How long a flush waits for the transport, in seconds.
    pub flush_timeout: u64,
    /// Queued items that trigger a send without an explicit flush.
    pub batch_size: usize,
    pub person: Option<Person>,
    pub person_fn: Option<String>,
    #[serde(alias = "checkIgnore")]
    pub check_ignore: Option<String>,
    pub custom: Map<String, Value>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            endpoint: API_ENDPOINT.to_string(),
            base_api_url: API_ENDPOINT.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            branch: BRANCH.to_string(),
            code_version: String::new(),
            host: None,
            root: None,
            framework: None,
            capture_error_stacktraces: true,
            scrub_fields: default_scrub_fields(),
            scrub_whitelist: Vec::new(),
            exception_sample_rates: BTreeMap::new(),
            error_sample_rates: BTreeMap::new(),
            proxy: None,
            timeout: 3,
            flush_timeout: 10,
            batch_size: 50,
            person: None,
            person_fn: None,
            check_ignore: None,
            custom: Map::new(),
        }
    }
}

impl ServerConfig {
    /// Effective API base URL, always ending with `/`.
    pub fn api_base(&self) -> String {
        let base = if self.endpoint.trim().is_empty() {
            self.base_api_url.trim()
        } else {
            self.endpoint.trim()
        };
        if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn flush_wait(&self) -> Duration {
        Duration::from_secs(self.flush_timeout)
    }

    /// Sample rates with missing or zero entries removed.
    pub fn exception_rates(&self) -> BTreeMap<String, f64> {
        normalize_rates(&self.exception_sample_rates)
    }

    pub fn error_rates(&self) -> BTreeMap<String, f64> {
        normalize_rates(&self.error_sample_rates)
    }
}

fn normalize_rates(rates: &BTreeMap<String, SampleRate>) -> BTreeMap<String, f64> {
    rates
        .iter()
        .filter_map(|(name, entry)| match entry.rate {
            Some(rate) if rate != 0.0 => Some((name.clone(), rate)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_appends_slash() {
        let config = ServerConfig {
            endpoint: "http://localhost:8080/api/1".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.api_base(), "http://localhost:8080/api/1/");
    }

    #[test]
    fn test_api_base_falls_back_to_base_api_url() {
        let config = ServerConfig {
            endpoint: String::new(),
            base_api_url: "http://legacy/api/1/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.api_base(), "http://legacy/api/1/");
    }

    #[test]
    fn test_zero_and_missing_rates_are_removed() {
        let mut config = ServerConfig::default();
        config
            .exception_sample_rates
            .insert("app::NotFound".to_string(), SampleRate { rate: Some(0.5) });
        config
            .exception_sample_rates
            .insert("app::Denied".to_string(), SampleRate { rate: Some(0.0) });
        config
            .exception_sample_rates
            .insert("app::Gone".to_string(), SampleRate { rate: None });

        let rates = config.exception_rates();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates["app::NotFound"], 0.5);
    }
}
