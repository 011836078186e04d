use crate::discovery::handshake::verify;
use crate::discovery::probe::probe;

use models::PortRange;

use std::time::Duration;

use log::{debug, info};

/// Result of walking the candidate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Survey {
    /// An occupied port answered the handshake as this application.
    Existing(u16),
    /// Nothing matched; this is the lowest port nobody was listening on.
    Free(u16),
    /// Every port is held by something else.
    Exhausted,
}

/// First-fit ascending scan for a port nobody is listening on.
///
/// Returns `None` when every port in `range` accepts connections.
pub async fn find_free_port(range: PortRange, timeout: Duration) -> Option<u16> {
    for port in range.ports() {
        if !probe(port, timeout).await {
            debug!("Port {port} is free");
            return Some(port);
        }
    }

    debug!("No free port in {range}");
    None
}

/// Walk the whole range, handshake-verifying every occupied port.
///
/// An instance of this application found anywhere in the range wins over a
/// free port, so a lost or corrupted marker never leads to a second server.
/// Ports are visited in ascending order and the first match is returned.
pub async fn survey(
    range: PortRange,
    probe_timeout: Duration,
    handshake_timeout: Duration,
) -> Survey {
    let mut first_free = None;

    for port in range.ports() {
        if !probe(port, probe_timeout).await {
            if first_free.is_none() {
                first_free = Some(port);
            }
            continue;
        }

        if verify(port, handshake_timeout).await {
            info!("Found running instance on port {port} while scanning {range}");
            return Survey::Existing(port);
        }

        debug!("Port {port} is held by another service, skipping");
    }

    match first_free {
        Some(port) => Survey::Free(port),
        None => Survey::Exhausted,
    }
}
