//! Test helpers for instance-core integration tests.
//!
//! - Finding loopback ports nobody is listening on
//! - Starting a real application server on an ephemeral port
//! - A browser launcher that records instead of opening
//! - Polling for asynchronous side effects

use instance_core::browser::BrowserLauncher;
use instance_core::config::AppConfig;
use instance_core::error::browser::BrowserError;
use instance_core::roster::RosterStore;
use instance_core::server::{RollCallServer, ServerHandle};
use models::PortRange;

use std::net::TcpListener as StdTcpListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::net::TcpListener;

/// Test helper: A loopback port that was free a moment ago.
pub fn free_port() -> u16 {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    listener.local_addr().expect("No local address").port()
}

/// Test helper: First port of `count` consecutive loopback ports that are all free.
pub fn free_port_run(count: u16) -> u16 {
    for _ in 0..100 {
        let first = free_port();
        if u32::from(first) + u32::from(count) > u32::from(u16::MAX) {
            continue;
        }

        let held: Vec<_> = (first..first + count)
            .map_while(|port| StdTcpListener::bind(("127.0.0.1", port)).ok())
            .collect();

        if held.len() == usize::from(count) {
            return first;
        }
    }

    panic!("Could not find {count} consecutive free ports");
}

pub fn range(start: u16, len: u16) -> PortRange {
    PortRange::new(start, start + len).expect("Valid test range")
}

/// Test helper: Config scanning only `range`, with short timeouts and no browser delay.
pub fn test_config(range: PortRange) -> AppConfig {
    let mut config = AppConfig::default();
    config.ports.range = range;
    config.ports.scan_probe_timeout_ms = 300;
    config.ports.marker_timeout_ms = 1_000;
    config.ports.handshake_timeout_ms = 1_000;
    config.browser.delay_ms = 0;
    config.browser.ready_timeout_ms = 3_000;
    config
}

pub fn test_server(dir: &Path) -> RollCallServer {
    RollCallServer::new(
        RosterStore::new(dir.join("students.json")),
        dir.join("static"),
    )
}

/// Test helper: Real application server on an ephemeral port.
pub async fn start_server(dir: &Path) -> ServerHandle {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");

    test_server(dir)
        .serve(listener)
        .expect("Failed to start test server")
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build HTTP client")
}

/// Browser launcher that remembers every URL it was asked to open.
#[derive(Debug, Default, Clone)]
pub struct RecordingBrowser {
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingBrowser {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("Recorder lock poisoned").clone()
    }
}

impl BrowserLauncher for RecordingBrowser {
    fn open(&self, url: &str) -> Result<(), BrowserError> {
        self.opened
            .lock()
            .expect("Recorder lock poisoned")
            .push(url.to_string());
        Ok(())
    }
}

/// Test helper: Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_for(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    condition()
}
