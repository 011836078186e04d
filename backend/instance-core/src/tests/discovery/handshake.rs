// Unit tests for handshake module private functions
// Behaviour against live services is covered in integration_tests/discovery/handshake.rs

use crate::discovery::handshake::handshake_url;

/// **VALUE**: Verifies the handshake always targets the loopback `/ping` endpoint.
///
/// **WHY THIS MATTERS**: Instances only bind `127.0.0.1`. A handshake sent to
/// `localhost` could resolve to `::1` and miss a running instance entirely.
///
/// **BUG THIS CATCHES**: Would catch a refactor that changes host, scheme or path.
#[test]
fn given_port_when_handshake_url_built_then_targets_loopback_ping() {
    // GIVEN: A port in the default range
    let port = 5003;

    // WHEN: Building the handshake URL
    let url = handshake_url(port);

    // THEN: Should be the plain-HTTP loopback ping endpoint
    assert_eq!(url, "http://127.0.0.1:5003/ping");
}
