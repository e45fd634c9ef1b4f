use httpmock::prelude::*;
use rollbar_log_bridge::config::ServerConfig;
use rollbar_log_bridge::notifier::{self, NotifierConfig};
use rollbar_log_bridge::{Level, Providers, ReportPayload};
use serde_json::Map;
use std::sync::Arc;

fn server_config(endpoint: String, environment: &str) -> ServerConfig {
    ServerConfig {
        access_token: "server-token".to_string(),
        endpoint,
        environment: environment.to_string(),
        ..ServerConfig::default()
    }
}

#[test]
fn test_second_init_returns_running_notifier() {
    let first_server = MockServer::start();
    let first = first_server.mock(|when, then| {
        when.method(POST)
            .path("/api/1/item/")
            .json_body_partial(r#"{"data":{"environment":"first"}}"#);
        then.status(200);
    });
    let second_server = MockServer::start();
    let second = second_server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let config = server_config(first_server.url("/api/1/"), "first");
    let notifier = notifier::init(NotifierConfig::resolve(&config, &Providers::new())).unwrap();
    notifier
        .log(ReportPayload::message(Level::Error, "queued", Map::new(), Map::new()))
        .unwrap();

    let config = server_config(second_server.url("/api/1/"), "second");
    let again = notifier::init(NotifierConfig::resolve(&config, &Providers::new())).unwrap();
    assert!(std::ptr::addr_eq(Arc::as_ptr(&notifier), Arc::as_ptr(&again)));

    // The item queued before the second call is still delivered, to the first endpoint.
    again.flush().unwrap();
    first.assert_hits(1);
    second.assert_hits(0);
}
