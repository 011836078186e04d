use crate::helpers::free_port;

use instance_core::discovery::probe::probe;

use std::time::Duration;

use tokio::net::TcpListener;

const PROBE_TIMEOUT: Duration = Duration::from_millis(300);

/// **VALUE**: A listening port is reported as reachable.
///
/// **WHY THIS MATTERS**: The allocator must never pick a port something else already
/// listens on, or the bind fails and the launch burns its retry.
#[tokio::test]
async fn given_listening_port_when_probed_then_reports_reachable() {
    // GIVEN: Something listening on a loopback port
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("address").port();

    // WHEN: Probing it
    let reachable = probe(port, PROBE_TIMEOUT).await;

    // THEN: It is reachable
    assert!(reachable, "Listening port should be reachable");
}

/// **VALUE**: A port nobody listens on is reported as free, quickly.
///
/// **BUG THIS CATCHES**: Would catch a refused connection being treated as an error
/// that aborts the scan instead of "not reachable".
#[tokio::test]
async fn given_closed_port_when_probed_then_reports_unreachable() {
    // GIVEN: A port that was just released
    let port = free_port();

    // WHEN: Probing it
    let reachable = probe(port, PROBE_TIMEOUT).await;

    // THEN: It is not reachable
    assert!(!reachable, "Closed port should not be reachable");
}
