#![warn(rust_2024_compatibility)]
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. ConfigError in config module
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

//! Reports application errors to a Rollbar-compatible tracker.
//!
//! Log events flow through [`ReportHandler`]: a level gate, the exclusion
//! list, translation into a [`ReportPayload`], and the delivery buffer that
//! hands payloads to a [`Notifier`] and flushes them on demand, on drop, or
//! when the process panics. [`ReportLayer`] plugs the handler into
//! `tracing`; [`BuildTracker`] records deployments.

pub mod api;
pub mod app;
pub mod buffer;
pub mod config;
pub mod domain;
pub mod exclusion;
pub mod filter;
pub mod handler;
pub mod layer;
pub mod notifier;
pub mod providers;
pub mod tracker;
pub mod translator;

pub use api::{ApiError, BuildApi, BuildPayload, BuildResponse, HttpApiClient};
pub use buffer::DeliveryBuffer;
pub use config::{BridgeConfig, ConfigError};
pub use domain::{
    BridgeError, ErrorObject, Frame, Level, LogEvent, ReportPayload, Severity, TransportError,
    map_level, map_level_code,
};
pub use exclusion::{ExclusionList, ExclusionMatcher, KnownKinds, should_skip};
pub use filter::{Filter, Length, process, truncate};
pub use handler::{ReportHandler, ReportHandlerBuilder};
pub use layer::{FlushGuard, ReportLayer};
pub use notifier::{HttpNotifier, Notifier, NotifierConfig};
pub use providers::{CheckIgnore, Person, PersonProvider, Providers};
pub use tracker::BuildTracker;
pub use translator::ReportTranslator;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
