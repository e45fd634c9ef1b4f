use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum LoggingError {
    #[error("Invalid filter '{filter}': {details}")]
    InvalidFilter { filter: String, details: String },
    #[error("Failed to set global tracing subscriber: {0}")]
    AlreadySet(String),
}

// HTTP internals stay quiet unless asked for through RUST_LOG.
const DEFAULT_DIRECTIVES: &[(&str, LogLevel)] = &[
    ("hyper", LogLevel::Warn),
    ("hyper_util", LogLevel::Warn),
    ("reqwest", LogLevel::Warn),
    ("h2", LogLevel::Warn),
    ("rustls", LogLevel::Warn),
];

pub fn build_filter_string(default_level: LogLevel) -> String {
    let mut parts = Vec::with_capacity(DEFAULT_DIRECTIVES.len() + 1);
    parts.push(default_level.as_str().to_string());
    for (target, level) in DEFAULT_DIRECTIVES {
        parts.push(format!("{}={}", target, level.as_str()));
    }
    parts.join(",")
}

/// Installs the global subscriber once. `RUST_LOG` wins over `level`.
pub fn setup_logging(level: LogLevel) -> Result<(), LoggingError> {
    static RESULT: OnceLock<Result<(), LoggingError>> = OnceLock::new();

    RESULT
        .get_or_init(|| {
            let filter_string = build_filter_string(level);
            let env_filter = match std::env::var("RUST_LOG") {
                Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
                    .map_err(|e| LoggingError::InvalidFilter {
                        filter: directives.clone(),
                        details: e.to_string(),
                    })?,
                _ => EnvFilter::try_new(&filter_string).map_err(|e| {
                    LoggingError::InvalidFilter {
                        filter: filter_string.clone(),
                        details: e.to_string(),
                    }
                })?,
            };

            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            );

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| LoggingError::AlreadySet(e.to_string()))
        })
        .clone()
}
