use crate::base_url;

use models::{HANDSHAKE_PATH, PingResponse};

use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};

pub(crate) fn handshake_url(port: u16) -> String {
    format!("{}{HANDSHAKE_PATH}", base_url(port))
}

/// Confirm that the listener on `port` is an instance of this application.
///
/// Issues `GET http://127.0.0.1:<port>/ping` bounded by `timeout` and returns
/// `true` only for a `200` whose JSON body carries the exact application
/// identifier. Connection failures, timeouts, other statuses, unparsable
/// bodies and foreign identifiers all return `false`.
///
/// Environment proxies are bypassed; the check is strictly loopback.
pub async fn verify(port: u16, timeout: Duration) -> bool {
    let url = handshake_url(port);

    let client = match Client::builder().no_proxy().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            debug!("Handshake client for port {port} could not be built: {e}");
            return false;
        }
    };

    let response = match client.get(&url).send().await {
        Ok(resp) if resp.status() == StatusCode::OK => resp,
        Ok(resp) => {
            debug!("Handshake on port {port} failed: status={}", resp.status());
            return false;
        }
        Err(e) => {
            debug!("Handshake on port {port} failed: {e}");
            return false;
        }
    };

    match response.json::<PingResponse>().await {
        Ok(payload) if payload.is_from_this_application() => {
            debug!("Handshake on port {port} succeeded");
            true
        }
        Ok(payload) => {
            debug!(
                "Handshake on port {port} answered by '{}', not this application",
                payload.app
            );
            false
        }
        Err(e) => {
            debug!("Handshake on port {port} returned an unexpected body: {e}");
            false
        }
    }
}
