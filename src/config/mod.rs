mod client;
pub mod serde_helpers;
mod server;
mod validation;

use crate::domain::Severity;
use crate::exclusion::ExclusionList;
use serde::{Deserialize, Serialize};
use serde_helpers::{load_env_string, load_env_string_opt, load_env_var};
use std::path::Path;
use thiserror::Error;

pub use client::{AutoInstrument, ClientConfig, JS_ITEMS_PER_MINUTE, JS_MAX_ITEMS, JS_UNCAUGHT_LEVEL};
pub use serde_helpers::SampleRate;
pub use server::{API_ENDPOINT, BRANCH, DEFAULT_ENVIRONMENT, ServerConfig, default_scrub_fields};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

/// Complete bridge settings.
///
/// ```toml
/// enable = true
/// exclude = ["app::http::NotFound"]
///
/// [rollbar]
/// access_token = "..."
/// environment = "production"
///
/// [rollbar_js]
/// accessToken = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub enable: bool,
    /// Error types never reported, checked in the order given. There is no
    /// built-in list; an absent key excludes nothing.
    pub exclude: ExclusionList,
    /// Minimum severity the handler reports.
    pub level: Severity,
    /// Whether handled events continue to other handlers.
    pub bubble: bool,
    pub rollbar: ServerConfig,
    pub rollbar_js: ClientConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enable: true,
            exclude: ExclusionList::default(),
            level: Severity::Error,
            bubble: true,
            rollbar: ServerConfig::default(),
            rollbar_js: ClientConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Loads `ROLLBAR_CONFIG` (inline TOML) if set, then applies the
    /// individual `ROLLBAR_*` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("ROLLBAR_CONFIG") {
            Ok(inline) => toml::from_str(&inline)?,
            Err(_) => BridgeConfig::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a file when given, otherwise the environment; overrides apply to both.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let mut config: BridgeConfig = toml::from_str(&content)?;
                config.apply_env_overrides()?;
                config.validate()?;
                Ok(config)
            }
            None => Self::from_env(),
        }
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        load_env_var("ROLLBAR_ENABLE", &mut self.enable)?;
        load_env_string("ROLLBAR_ACCESS_TOKEN", &mut self.rollbar.access_token);
        load_env_string("ROLLBAR_ENVIRONMENT", &mut self.rollbar.environment);
        load_env_string("ROLLBAR_ENDPOINT", &mut self.rollbar.endpoint);
        load_env_string("ROLLBAR_CODE_VERSION", &mut self.rollbar.code_version);
        load_env_string_opt("ROLLBAR_PROXY", &mut self.rollbar.proxy);
        load_env_var("ROLLBAR_TIMEOUT", &mut self.rollbar.timeout)?;
        load_env_string("ROLLBAR_JS_ACCESS_TOKEN", &mut self.rollbar_js.access_token);

        if let Ok(level) = std::env::var("ROLLBAR_LEVEL") {
            self.level = Severity::from_name(&level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid ROLLBAR_LEVEL: {level}")))?;
        }
        Ok(())
    }

    /// The server pipeline runs only when enabled and given an access token.
    pub fn is_configured(&self) -> bool {
        self.enable && !self.rollbar.access_token.trim().is_empty()
    }
}
