//! Domain layer for rollbar-log-bridge.
//!
//! Contains the canonical types shared across all modules:
//! - `LogEvent`: an application log record handed to the pipeline
//! - `ErrorObject`: an error value identified by its type name
//! - `ReportPayload`: the normalised report handed to the notifier
//! - `Severity` / `Level`: host severities and backend levels
//! - `BridgeError` / `TransportError`: top-level error types

pub mod error;
pub mod error_object;
pub mod log_event;
pub mod report;
pub mod severity;

pub use error::{BridgeError, TransportError};
pub use error_object::{ErrorObject, Frame};
pub use log_event::LogEvent;
pub use report::ReportPayload;
pub use severity::{Level, Severity, map_level, map_level_code};
