use rollbar_log_bridge::app::{DeployArgs, DeployOutcome, run_deploy};
use rollbar_log_bridge::{ApiError, BuildApi, BuildPayload, BuildTracker, HttpApiClient};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

fn args(revision: &str) -> DeployArgs {
    DeployArgs {
        revision: revision.to_string(),
        comment: Some("release notes".to_string()),
        rollbar_username: Some("alice".to_string()),
        local_username: Some("bob".to_string()),
    }
}

fn client(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(&format!("{}/api/1", server.uri()), Duration::from_secs(5), None).unwrap()
}

#[tokio::test]
async fn test_deploy_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1/deploy/"))
        .and(body_partial_json(json!({
            "access_token": "server-token",
            "environment": "production",
            "revision": "R2.1",
            "comment": "release notes",
            "rollbar_username": "alice",
            "local_username": "bob",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "deploy_id": 1 } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tracker = BuildTracker::new("server-token", Arc::new(client(&server)));
    let mut out = Vec::new();
    let outcome = run_deploy(&tracker, "production", &args("R2.1"), &mut out)
        .await
        .unwrap();

    assert_eq!(outcome, DeployOutcome::Tracked);
    assert_eq!(String::from_utf8(out).unwrap(), "Done.\n");
}

#[tokio::test]
async fn test_rejected_deploy_prints_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1/deploy/"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string(r#"{"err":1,"message":"invalid access token"}"#),
        )
        .mount(&server)
        .await;

    let tracker = BuildTracker::new("bad-token", Arc::new(client(&server)));
    let mut out = Vec::new();
    let outcome = run_deploy(&tracker, "production", &args("R3"), &mut out)
        .await
        .unwrap();

    assert!(!outcome.is_tracked());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("Build has been not tracked: "));
    assert!(printed.contains("invalid access token"));
}

#[tokio::test]
async fn test_long_comment_is_truncated_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1/deploy/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = client(&server);
    let tracker = BuildTracker::new("server-token", Arc::new(api));
    let comment = "x".repeat(30_000);
    let response = tracker
        .track_build("production", "R2.1", Some(&comment), Some("alice"), Some("bob"))
        .await
        .unwrap()
        .unwrap();
    assert!(response.is_success());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["comment"].as_str().unwrap().len(), 21_800);
}

#[tokio::test]
async fn test_client_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let api = HttpApiClient::new(&server.uri(), Duration::from_millis(100), None).unwrap();
    let payload = BuildPayload {
        access_token: "t".to_string(),
        environment: "production".to_string(),
        revision: "R1".to_string(),
        comment: String::new(),
        rollbar_username: String::new(),
        local_username: String::new(),
    };

    let result = api.track_build(&payload).await;
    assert!(matches!(
        result,
        Err(ApiError::RequestTimeout(_) | ApiError::NetworkError(_))
    ));
}

#[test]
fn test_invalid_endpoint_is_rejected() {
    assert!(matches!(
        HttpApiClient::new("not a url", Duration::from_secs(1), None),
        Err(ApiError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        HttpApiClient::new(
            "https://api.example.com/api/1/",
            Duration::from_secs(1),
            Some("::not a proxy")
        ),
        Err(ApiError::InvalidConfiguration(_))
    ));
}
