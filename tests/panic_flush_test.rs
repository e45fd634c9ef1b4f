use mockall::mock;
use rollbar_log_bridge::{DeliveryBuffer, Level, Notifier, ReportPayload, TransportError};
use serde_json::Map;
use serial_test::serial;
use std::sync::Arc;

mock! {
    pub Transport {}

    impl Notifier for Transport {
        fn log(&self, payload: ReportPayload) -> Result<(), TransportError>;
        fn flush(&self) -> Result<(), TransportError>;
    }
}

fn payload() -> ReportPayload {
    ReportPayload::message(Level::Critical, "about to crash", Map::new(), Map::new())
}

fn run_on_thread(name: &str, body: impl FnOnce() + Send + 'static) {
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .unwrap()
        .join()
        .unwrap();
}

#[test]
#[serial]
fn test_panic_on_main_thread_flushes_pending_reports() {
    let mut notifier = MockTransport::new();
    notifier.expect_log().times(1).returning(|_| Ok(()));
    notifier.expect_flush().times(1).returning(|| Ok(()));
    let buffer = DeliveryBuffer::new(Arc::new(notifier));

    run_on_thread("main", move || {
        buffer.submit(payload());
        assert!(buffer.has_pending_records());

        let result = std::panic::catch_unwind(|| panic!("unrecoverable state"));
        assert!(result.is_err());
        assert!(!buffer.has_pending_records());
    });
}

#[test]
#[serial]
fn test_panic_on_worker_thread_leaves_flush_to_owner() {
    let mut notifier = MockTransport::new();
    notifier.expect_log().times(1).returning(|_| Ok(()));
    notifier.expect_flush().times(1).returning(|| Ok(()));
    let buffer = DeliveryBuffer::new(Arc::new(notifier));

    run_on_thread("worker", move || {
        buffer.submit(payload());

        let result = std::panic::catch_unwind(|| panic!("task failed"));
        assert!(result.is_err());
        assert!(buffer.has_pending_records());

        // Dropping the owner delivers them.
        drop(buffer);
    });
}
