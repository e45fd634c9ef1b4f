use thiserror::Error;

/// Top-level error type for the reporting bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("API error: {0}")]
    Api(#[from] crate::api::ApiError),
}

/// Failures raised by a notifier while queueing or delivering items.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Notifier worker is not running")]
    Closed,
    #[error("Flush timed out after {0}s")]
    FlushTimeout(u64),
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
