use super::item::{build_item, sample_rate};
use super::{Notifier, NotifierConfig};
use crate::domain::{ReportPayload, TransportError};
use parking_lot::Mutex;
use reqwest::blocking::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

enum Task {
    Item(Box<Value>),
    Flush(Sender<Result<usize, TransportError>>),
    Shutdown,
}

/// Notifier that posts items from a dedicated worker thread.
///
/// Items are queued by `log` and sent when `flush` is called or when
/// `batch_size` items are waiting. Running the blocking client on its own
/// thread keeps `flush` usable from both sync code and async runtimes.
pub struct HttpNotifier {
    config: NotifierConfig,
    exception_rates: BTreeMap<String, f64>,
    error_rates: BTreeMap<String, f64>,
    tasks: Sender<Task>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HttpNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self, TransportError> {
        let base = config.server.api_base();
        let item_url = Url::parse(&base)
            .and_then(|url| url.join("item/"))
            .map_err(|e| {
                TransportError::InvalidConfiguration(format!("Invalid endpoint URL '{base}': {e}"))
            })?;

        let proxy = match config.server.proxy.as_deref().filter(|p| !p.is_empty()) {
            Some(proxy) => Some(reqwest::Proxy::all(proxy).map_err(|e| {
                TransportError::InvalidConfiguration(format!("Invalid proxy '{proxy}': {e}"))
            })?),
            None => None,
        };

        let transport = Transport {
            timeout: config.server.request_timeout(),
            proxy,
            item_url,
            access_token: config.server.access_token.clone(),
            batch_size: config.server.batch_size.max(1),
        };

        let (tasks, receiver) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("rollbar-notifier".to_string())
            .spawn(move || transport.run(receiver))
            .map_err(|e| {
                TransportError::InvalidConfiguration(format!("Failed to start worker: {e}"))
            })?;

        Ok(Self {
            exception_rates: config.server.exception_rates(),
            error_rates: config.server.error_rates(),
            config,
            tasks,
            worker: Mutex::new(Some(worker)),
        })
    }

    fn sampled_out(&self, payload: &ReportPayload) -> bool {
        match sample_rate(payload, &self.exception_rates, &self.error_rates) {
            Some(rate) if rate < 1.0 => rand::random::<f64>() >= rate,
            _ => false,
        }
    }
}

impl Notifier for HttpNotifier {
    fn log(&self, payload: ReportPayload) -> Result<(), TransportError> {
        if let Some(policy) = &self.config.check_ignore
            && policy.check_ignore(false, &payload)
        {
            debug!("Report ignored by check-ignore policy");
            return Ok(());
        }

        if self.sampled_out(&payload) {
            debug!(level = %payload.level, "Report dropped by sample rate");
            return Ok(());
        }

        let item = build_item(&self.config, &payload);
        self.tasks
            .send(Task::Item(Box::new(item)))
            .map_err(|_| TransportError::Closed)
    }

    fn flush(&self) -> Result<(), TransportError> {
        let (ack, done) = mpsc::channel();
        self.tasks
            .send(Task::Flush(ack))
            .map_err(|_| TransportError::Closed)?;

        match done.recv_timeout(self.config.server.flush_wait()) {
            Ok(Ok(sent)) => {
                debug!(sent, "Flushed queued reports");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(RecvTimeoutError::Timeout) => {
                Err(TransportError::FlushTimeout(self.config.server.flush_timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
        }
    }
}

impl Drop for HttpNotifier {
    fn drop(&mut self) {
        let _ = self.tasks.send(Task::Shutdown);
        if let Some(worker) = self.worker.lock().take()
            && worker.join().is_err()
        {
            error!("Notifier worker panicked during shutdown");
        }
    }
}

struct Transport {
    timeout: Duration,
    proxy: Option<reqwest::Proxy>,
    item_url: Url,
    access_token: String,
    batch_size: usize,
}

impl Transport {
    // The blocking client is built and dropped on the worker thread only.
    fn run(mut self, receiver: Receiver<Task>) {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy) = self.proxy.take() {
            builder = builder.proxy(proxy);
        }
        let client = match builder.build() {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build notifier HTTP client: {}", e);
                return;
            }
        };

        let mut queue: Vec<Value> = Vec::new();
        while let Ok(task) = receiver.recv() {
            match task {
                Task::Item(item) => {
                    queue.push(*item);
                    if queue.len() >= self.batch_size
                        && let Err(e) = self.send_all(&client, &mut queue)
                    {
                        warn!("Batch delivery failed: {}", e);
                    }
                }
                Task::Flush(ack) => {
                    let result = self.send_all(&client, &mut queue);
                    let _ = ack.send(result);
                }
                Task::Shutdown => break,
            }
        }

        if let Err(e) = self.send_all(&client, &mut queue) {
            warn!("Delivery during shutdown failed: {}", e);
        }
    }

    /// Sends every queued item; the first failure is returned after the rest are tried.
    fn send_all(&self, client: &Client, queue: &mut Vec<Value>) -> Result<usize, TransportError> {
        let mut sent = 0;
        let mut first_error = None;
        for item in queue.drain(..) {
            match self.send(client, &item) {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!("Failed to deliver report: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(sent),
        }
    }

    fn send(&self, client: &Client, item: &Value) -> Result<(), TransportError> {
        let response = client
            .post(self.item_url.clone())
            .header("X-Rollbar-Access-Token", &self.access_token)
            .json(item)
            .send()?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::HttpError {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            })
        }
    }
}
