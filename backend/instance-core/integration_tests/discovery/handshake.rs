use crate::helpers::{free_port, start_server};

use instance_core::discovery::handshake::verify;

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(1_000);

fn port_of(server: &MockServer) -> u16 {
    server.address().port()
}

/// **VALUE**: A real instance of this application passes its own handshake.
///
/// **WHY THIS MATTERS**: This is the check every later launch relies on to find the
/// running instance. If it fails against the real server, every launch starts a new one.
#[tokio::test]
async fn given_running_instance_when_verified_then_returns_true() {
    // GIVEN: A real application server
    let dir = TempDir::new().expect("tempdir");
    let mut handle = start_server(dir.path()).await;

    // WHEN: Verifying its port
    let verified = verify(handle.port(), HANDSHAKE_TIMEOUT).await;

    // THEN: It is recognised
    assert!(verified, "Running instance should pass the handshake");

    handle.shutdown();
    handle.stopped().await.expect("Clean shutdown");
}

/// **VALUE**: A different service answering `/ping` with its own identity is rejected.
///
/// **BUG THIS CATCHES**: Would catch the handshake accepting any 200 response,
/// which would make the launcher delegate to an unrelated dev server.
#[tokio::test]
async fn given_service_with_other_identity_when_verified_then_returns_false() {
    // GIVEN: A foreign service with a ping endpoint of its own
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"app": "SomethingElse", "status": "ok"})),
        )
        .mount(&server)
        .await;

    // WHEN/THEN: It is not this application
    assert!(!verify(port_of(&server), HANDSHAKE_TIMEOUT).await);
}

/// **VALUE**: The identity must come with a success status.
///
/// **BUG THIS CATCHES**: Would catch a handshake that only looks at the body and
/// trusts an instance that is answering with errors.
#[tokio::test]
async fn given_matching_body_with_error_status_when_verified_then_returns_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"app": "RollCallPy", "status": "ok"})),
        )
        .mount(&server)
        .await;

    assert!(!verify(port_of(&server), HANDSHAKE_TIMEOUT).await);
}

/// **VALUE**: Non-JSON and incomplete bodies are "not ours", not a crash.
#[tokio::test]
async fn given_garbage_or_partial_body_when_verified_then_returns_false() {
    // GIVEN: One service with an HTML body, one with a partial identity
    let html = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>pong</html>"))
        .mount(&html)
        .await;

    let partial = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"app": "RollCallPy"})))
        .mount(&partial)
        .await;

    // WHEN/THEN: Neither verifies
    assert!(!verify(port_of(&html), HANDSHAKE_TIMEOUT).await);
    assert!(!verify(port_of(&partial), HANDSHAKE_TIMEOUT).await);
}

/// **VALUE**: A service that hangs is abandoned within the timeout.
///
/// **WHY THIS MATTERS**: A wedged process on one port must not stall the launch
/// for longer than the configured handshake timeout.
#[tokio::test]
async fn given_slow_service_when_verified_then_times_out_as_false() {
    // GIVEN: A service that answers correctly but far too late
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"app": "RollCallPy", "status": "ok"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    // WHEN: Verifying with a short timeout
    let started = std::time::Instant::now();
    let verified = verify(port_of(&server), Duration::from_millis(200)).await;

    // THEN: Gives up quickly and reports false
    assert!(!verified);
    assert!(started.elapsed() < Duration::from_secs(3), "Should honour the timeout");
}

#[tokio::test]
async fn given_nothing_listening_when_verified_then_returns_false() {
    assert!(!verify(free_port(), HANDSHAKE_TIMEOUT).await);
}
