use crate::domain::ReportPayload;
use crate::notifier::Notifier;
use parking_lot::{Mutex, const_mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tracing::{debug, warn};

struct BufferState {
    notifier: Option<Arc<dyn Notifier>>,
    has_pending: AtomicBool,
}

impl BufferState {
    fn flush(&self) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        // Cleared up front: a failed flush is not retried.
        if !self.has_pending.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = notifier.flush() {
            warn!("Failed to flush reports: {}", e);
        }
    }
}

/// Tracks reports handed to the notifier since the last flush.
///
/// Dropping the buffer flushes it, so keeping it in the scope that owns the
/// pipeline covers normal returns, early returns and unwinding. On the first
/// submit the buffer also registers with the process-wide panic hook, which
/// flushes every live buffer when a panic is going to end the process.
pub struct DeliveryBuffer {
    state: Arc<BufferState>,
    registered: AtomicBool,
}

impl DeliveryBuffer {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_notifier(Some(notifier))
    }

    /// A buffer whose operations are all no-ops.
    pub fn unconfigured() -> Self {
        Self::with_notifier(None)
    }

    fn with_notifier(notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            state: Arc::new(BufferState {
                notifier,
                has_pending: AtomicBool::new(false),
            }),
            registered: AtomicBool::new(false),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.state.notifier.is_some()
    }

    pub fn has_pending_records(&self) -> bool {
        self.state.has_pending.load(Ordering::Acquire)
    }

    pub fn submit(&self, payload: ReportPayload) {
        let Some(notifier) = &self.state.notifier else {
            return;
        };

        if !self.registered.swap(true, Ordering::AcqRel) {
            register_for_panic_flush(Arc::downgrade(&self.state));
        }
        install_panic_hook();

        match notifier.log(payload) {
            Ok(()) => self.state.has_pending.store(true, Ordering::Release),
            Err(e) => warn!("Failed to queue report: {}", e),
        }
    }

    pub fn flush(&self) {
        self.state.flush();
    }

    pub fn close(&self) {
        self.flush();
    }
}

impl Drop for DeliveryBuffer {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for DeliveryBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryBuffer")
            .field("configured", &self.is_configured())
            .field("has_pending_records", &self.has_pending_records())
            .finish()
    }
}

/// Buffers flushed by the panic hook; dead entries are pruned on registration.
static PANIC_FLUSH: Mutex<Vec<Weak<BufferState>>> = const_mutex(Vec::new());
static PANIC_HOOK: OnceLock<()> = OnceLock::new();

fn register_for_panic_flush(state: Weak<BufferState>) {
    let mut registered = PANIC_FLUSH.lock();
    registered.retain(|entry| entry.strong_count() > 0);
    registered.push(state);
}

/// Chains one process-wide hook in front of the existing one.
fn install_panic_hook() {
    if PANIC_HOOK.get().is_some() {
        return;
    }
    // `set_hook` panics when called from a panicking thread; the next submit
    // outside a panic installs it instead.
    if std::thread::panicking() {
        debug!("Deferring panic hook installation during panic");
        return;
    }
    PANIC_HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if panic_ends_process() {
                flush_registered();
            }
            previous(panic_info);
        }));
    });
}

/// Panics under `panic = "abort"` and on the main thread end the process.
/// Panics on other threads are usually caught (tokio tasks, `catch_unwind`)
/// and unwind through the owning scope anyway.
fn panic_ends_process() -> bool {
    cfg!(panic = "abort") || std::thread::current().name() == Some("main")
}

fn flush_registered() {
    // A panic inside a flush must not deadlock the hook on re-entry.
    let live: Vec<Arc<BufferState>> = match PANIC_FLUSH.try_lock_for(Duration::from_millis(100)) {
        Some(registered) => registered.iter().filter_map(Weak::upgrade).collect(),
        None => return,
    };
    for state in live {
        state.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Level, TransportError};
    use crate::notifier::MockNotifier;
    use serde_json::Map;

    fn payload() -> ReportPayload {
        ReportPayload::message(Level::Error, "disk full", Map::new(), Map::new())
    }

    #[test]
    fn test_submit_then_flush() {
        let mut notifier = MockNotifier::new();
        notifier.expect_log().times(1).returning(|_| Ok(()));
        notifier.expect_flush().times(1).returning(|| Ok(()));

        let buffer = DeliveryBuffer::new(Arc::new(notifier));
        assert!(!buffer.has_pending_records());

        buffer.submit(payload());
        assert!(buffer.has_pending_records());

        buffer.flush();
        assert!(!buffer.has_pending_records());

        // Second flush must not reach the notifier again.
        buffer.flush();
        buffer.close();
    }

    #[test]
    fn test_flush_without_records_is_noop() {
        let mut notifier = MockNotifier::new();
        notifier.expect_flush().never();

        let buffer = DeliveryBuffer::new(Arc::new(notifier));
        buffer.flush();
        assert!(!buffer.has_pending_records());
    }

    #[test]
    fn test_drop_flushes_pending_records() {
        let mut notifier = MockNotifier::new();
        notifier.expect_log().times(1).returning(|_| Ok(()));
        notifier.expect_flush().times(1).returning(|| Ok(()));

        {
            let buffer = DeliveryBuffer::new(Arc::new(notifier));
            buffer.submit(payload());
        }
    }

    #[test]
    fn test_failed_flush_is_not_retried() {
        let mut notifier = MockNotifier::new();
        notifier.expect_log().returning(|_| Ok(()));
        notifier
            .expect_flush()
            .times(1)
            .returning(|| Err(TransportError::Closed));

        let buffer = DeliveryBuffer::new(Arc::new(notifier));
        buffer.submit(payload());
        buffer.flush();
        assert!(!buffer.has_pending_records());
        buffer.close();
    }

    #[test]
    fn test_failed_log_does_not_mark_pending() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_log()
            .returning(|_| Err(TransportError::Closed));
        notifier.expect_flush().never();

        let buffer = DeliveryBuffer::new(Arc::new(notifier));
        buffer.submit(payload());
        assert!(!buffer.has_pending_records());
    }

    #[test]
    fn test_unconfigured_buffer_is_noop() {
        let buffer = DeliveryBuffer::unconfigured();
        buffer.submit(payload());
        buffer.flush();
        buffer.close();
        assert!(!buffer.is_configured());
        assert!(!buffer.has_pending_records());
    }
}
