use crate::helpers::{free_port_run, range, start_server, test_server};

use instance_core::discovery::allocator::{Survey, find_free_port, survey};
use instance_core::server::AppServer;

use std::net::TcpListener as StdTcpListener;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::MockServer;

const PROBE_TIMEOUT: Duration = Duration::from_millis(300);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(1_000);

/// **VALUE**: The lowest free port is chosen, skipping occupied ones.
///
/// **WHY THIS MATTERS**: Ascending first-fit keeps instances on predictable ports,
/// which is what makes the marker-less scan cheap in the common case.
#[tokio::test]
async fn given_first_port_occupied_when_searching_then_returns_next_port() {
    // GIVEN: Three consecutive ports, the first one held
    let start = free_port_run(3);
    let _held = StdTcpListener::bind(("127.0.0.1", start)).expect("hold first port");

    // WHEN: Searching the range
    let port = find_free_port(range(start, 3), PROBE_TIMEOUT).await;

    // THEN: The second port is returned
    assert_eq!(port, Some(start + 1));
}

/// **VALUE**: A fully occupied range reports exhaustion instead of guessing.
#[tokio::test]
async fn given_all_ports_occupied_when_searching_then_returns_none() {
    let start = free_port_run(2);
    let _a = StdTcpListener::bind(("127.0.0.1", start)).expect("hold port");
    let _b = StdTcpListener::bind(("127.0.0.1", start + 1)).expect("hold port");

    let port = find_free_port(range(start, 2), PROBE_TIMEOUT).await;

    assert_eq!(port, None);
}

/// **VALUE**: A running instance anywhere in the range wins over a lower free port.
///
/// **WHY THIS MATTERS**: With the marker lost, a second launch must still find the
/// existing instance instead of starting a duplicate on the lower free port.
///
/// **BUG THIS CATCHES**: Would catch the survey stopping at the first free port.
#[tokio::test]
async fn given_instance_above_free_port_when_surveyed_then_returns_existing() {
    // GIVEN: A free port followed by a running instance
    let start = free_port_run(2);
    let dir = TempDir::new().expect("tempdir");
    let mut handle = test_server(dir.path())
        .start(start + 1)
        .await
        .expect("Instance should bind");

    // WHEN: Surveying both ports
    let result = survey(range(start, 2), PROBE_TIMEOUT, HANDSHAKE_TIMEOUT).await;

    // THEN: The existing instance is reported
    assert_eq!(result, Survey::Existing(start + 1));

    handle.shutdown();
    handle.stopped().await.expect("Clean shutdown");
}

/// **VALUE**: Foreign services are skipped and the free port after them is offered.
#[tokio::test]
async fn given_foreign_service_then_free_port_when_surveyed_then_returns_free() {
    // GIVEN: A foreign HTTP service on the first port of a two-port run
    let start = free_port_run(2);
    let listener = StdTcpListener::bind(("127.0.0.1", start)).expect("bind foreign");
    let _foreign = MockServer::builder().listener(listener).start().await;

    // WHEN: Surveying
    let result = survey(range(start, 2), PROBE_TIMEOUT, HANDSHAKE_TIMEOUT).await;

    // THEN: The second port is offered
    assert_eq!(result, Survey::Free(start + 1));
}

#[tokio::test]
async fn given_only_foreign_services_when_surveyed_then_returns_exhausted() {
    let foreign = MockServer::start().await;
    let port = foreign.address().port();

    let result = survey(range(port, 1), PROBE_TIMEOUT, HANDSHAKE_TIMEOUT).await;

    assert_eq!(result, Survey::Exhausted);
}

/// **VALUE**: A single-port range holding our own instance is found, not exhausted.
#[tokio::test]
async fn given_instance_on_only_port_when_surveyed_then_returns_existing() {
    let dir = TempDir::new().expect("tempdir");
    let mut handle = start_server(dir.path()).await;
    let port = handle.port();

    let result = survey(range(port, 1), PROBE_TIMEOUT, HANDSHAKE_TIMEOUT).await;

    assert_eq!(result, Survey::Existing(port));

    handle.shutdown();
    handle.stopped().await.expect("Clean shutdown");
}
