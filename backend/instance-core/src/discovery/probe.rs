use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::trace;
use tokio::net::TcpStream;
use tokio::time::timeout as TokioTimeout;

/// Check whether a TCP listener accepts connections on `127.0.0.1:port`.
///
/// The connection is dropped as soon as it is established. Refused, timed
/// out and any other socket error all return `false`.
pub async fn probe(port: u16, timeout: Duration) -> bool {
    let address = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

    match TokioTimeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_stream)) => {
            trace!("Port {port} is accepting connections");
            true
        }
        Ok(Err(e)) => {
            trace!("Port {port} is not reachable: {e}");
            false
        }
        Err(_) => {
            trace!("Probe of port {port} timed out after {timeout:?}");
            false
        }
    }
}
