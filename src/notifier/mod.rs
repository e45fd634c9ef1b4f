//! Notifier contract and the process-wide HTTP notifier.

pub mod http;
pub mod item;

pub use http::HttpNotifier;

use crate::config::ServerConfig;
use crate::domain::{ReportPayload, TransportError};
use crate::providers::{CheckIgnore, PersonProvider, Providers};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Transports report payloads to the error tracker.
///
/// `log` must only queue locally; delivery happens on `flush`.
#[cfg_attr(test, automock)]
pub trait Notifier: Send + Sync {
    fn log(&self, payload: ReportPayload) -> Result<(), TransportError>;
    fn flush(&self) -> Result<(), TransportError>;
}

/// Settings handed to a notifier at construction.
#[derive(Clone)]
pub struct NotifierConfig {
    pub server: ServerConfig,
    pub person_provider: Option<Arc<dyn PersonProvider>>,
    pub check_ignore: Option<Arc<dyn CheckIgnore>>,
}

impl NotifierConfig {
    /// Resolves provider names and fills the `root`, `framework` and `host`
    /// fields the host does not usually set itself.
    pub fn resolve(server: &ServerConfig, providers: &Providers) -> Self {
        let mut server = server.clone();
        if server.root.is_none() {
            server.root = std::env::current_dir().ok().or_else(|| Some(PathBuf::from(".")));
        }
        server.framework = Some(format!(
            "{} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        if server.host.is_none() {
            server.host = hostname::get()
                .ok()
                .and_then(|name| name.into_string().ok());
        }

        Self {
            person_provider: providers.resolve_person(server.person_fn.as_deref()),
            check_ignore: providers.resolve_check_ignore(server.check_ignore.as_deref()),
            server,
        }
    }
}

impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("server", &self.server)
            .field("person_provider", &self.person_provider.is_some())
            .field("check_ignore", &self.check_ignore.is_some())
            .finish()
    }
}

static NOTIFIER: OnceLock<Arc<HttpNotifier>> = OnceLock::new();

/// Returns the process-wide notifier, starting it on first use.
///
/// Later calls return the running instance and ignore `config`.
pub fn init(config: NotifierConfig) -> Result<Arc<dyn Notifier>, TransportError> {
    if let Some(existing) = NOTIFIER.get() {
        debug!("Notifier already initialized, reusing running instance");
        let notifier: Arc<dyn Notifier> = existing.clone();
        return Ok(notifier);
    }

    let candidate = Arc::new(HttpNotifier::new(config)?);
    match NOTIFIER.set(candidate) {
        Ok(()) => {}
        Err(_lost_race) => debug!("Notifier initialized concurrently, discarding duplicate"),
    }
    NOTIFIER
        .get()
        .cloned()
        .map(|notifier| notifier as Arc<dyn Notifier>)
        .ok_or(TransportError::Closed)
}
