//! End-to-end launch scenarios: each test runs one or more coordinators against
//! real loopback ports, a real application server and a temp data directory.

use crate::helpers::{
    RecordingBrowser, free_port, free_port_run, range, start_server, test_config, test_server,
    wait_for,
};

use common::ErrorLocation;
use instance_core::coordinator::{Coordinator, LaunchOutcome};
use instance_core::discovery::handshake::verify;
use instance_core::error::coordinator::CoordinatorError;
use instance_core::error::server::ServerError;
use instance_core::registry::PortMarker;
use instance_core::server::{AppServer, RollCallServer, ServerHandle};
use models::PortRange;

use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::MockServer;

const WAIT: Duration = Duration::from_secs(5);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(1_000);

fn coordinator(
    dir: &TempDir,
    range: PortRange,
    browser: &RecordingBrowser,
) -> Coordinator<RollCallServer> {
    coordinator_with(dir, range, browser, test_server(dir.path()))
}

fn coordinator_with<S: AppServer>(
    dir: &TempDir,
    range: PortRange,
    browser: &RecordingBrowser,
    server: S,
) -> Coordinator<S> {
    Coordinator::new(
        &test_config(range),
        PortMarker::new(dir.path().join("rollcall.port")),
        server,
        Arc::new(browser.clone()),
    )
}

/// Server that loses the bind race a fixed number of times before starting for real.
struct ContestedServer {
    inner: RollCallServer,
    losses_left: AtomicU32,
    calls: Arc<AtomicU32>,
}

impl ContestedServer {
    fn new(dir: &TempDir, losses: u32) -> (Self, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let server = Self {
            inner: test_server(dir.path()),
            losses_left: AtomicU32::new(losses),
            calls: Arc::clone(&calls),
        };
        (server, calls)
    }
}

impl AppServer for ContestedServer {
    async fn start(&self, port: u16) -> Result<ServerHandle, ServerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let lost = self
            .losses_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();

        if lost {
            return Err(ServerError::Bind {
                message: format!("Port {port} was taken by another launcher"),
                port,
                location: ErrorLocation::from(Location::caller()),
                source: IoError::new(ErrorKind::AddrInUse, "address in use"),
            });
        }

        self.inner.start(port).await
    }
}

/// Test helper: Run a coordinator in the background until the returned sender fires.
fn launch(
    coordinator: Coordinator<RollCallServer>,
) -> (
    oneshot::Sender<()>,
    JoinHandle<Result<LaunchOutcome, CoordinatorError>>,
) {
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        coordinator
            .run_until(async move {
                let _ = stop_rx.await;
            })
            .await
    });
    (stop_tx, task)
}

async fn wait_for_marker(marker: &PortMarker, port: u16) -> bool {
    wait_for(|| marker.read() == Some(port), WAIT).await
}

/// **VALUE**: First launch on a clean machine binds the lowest free port and records it.
///
/// **WHY THIS MATTERS**: This is the normal cold start. The marker is what lets every
/// later launch find this instance in a single handshake.
///
/// **BUG THIS CATCHES**: Would catch the marker being written before the bind, not at
/// all, or not cleaned up after shutdown.
#[tokio::test]
async fn given_no_marker_when_launched_then_binds_first_free_port_and_records_it() {
    // GIVEN: A clean data directory and a free two-port range
    let dir = TempDir::new().expect("tempdir");
    let start = free_port_run(2);
    let browser = RecordingBrowser::default();
    let marker = PortMarker::new(dir.path().join("rollcall.port"));

    // WHEN: Launching
    let (stop_tx, task) = launch(coordinator(&dir, range(start, 2), &browser));

    // THEN: The first port is served and recorded
    assert!(wait_for_marker(&marker, start).await, "Marker should name the bound port");
    assert!(verify(start, HANDSHAKE_TIMEOUT).await, "Instance should answer its handshake");

    // THEN: The browser is pointed at the new instance once it is ready
    let expected_url = format!("http://127.0.0.1:{start}/");
    assert!(wait_for(|| browser.opened() == vec![expected_url.clone()], WAIT).await);

    // WHEN: Shutting down
    stop_tx.send(()).expect("coordinator still running");
    let outcome = task.await.expect("join").expect("clean launch");

    // THEN: The outcome describes an owned instance and the marker is gone
    match outcome {
        LaunchOutcome::Served(instance) => {
            assert_eq!(instance.port, start);
            assert!(instance.owned);
            assert_eq!(instance.base_url, format!("http://127.0.0.1:{start}"));
        }
        other => panic!("Expected Served, got {other:?}"),
    }
    assert!(!marker.path().exists(), "Marker should be removed on shutdown");
    assert!(!verify(start, HANDSHAKE_TIMEOUT).await, "Port should be released");
}

/// **VALUE**: A marker naming a live instance hands off without binding anything.
///
/// **WHY THIS MATTERS**: Double-clicking the launcher twice must open the same
/// roster, not start a second server with a second view of the data.
#[tokio::test]
async fn given_live_marker_when_launched_then_delegates_without_binding() {
    // GIVEN: A running instance recorded in the marker
    let dir = TempDir::new().expect("tempdir");
    let mut running = start_server(dir.path()).await;
    let marker = PortMarker::new(dir.path().join("rollcall.port"));
    marker.write(running.port()).expect("write marker");

    // AND: A scan range that would otherwise be free
    let scan_port = free_port();
    let browser = RecordingBrowser::default();

    // WHEN: Launching
    let outcome = coordinator(&dir, range(scan_port, 1), &browser)
        .run_until(std::future::pending())
        .await
        .expect("delegation succeeds");

    // THEN: Control is handed to the running instance
    match &outcome {
        LaunchOutcome::Delegated(instance) => {
            assert_eq!(instance.port, running.port());
            assert!(!instance.owned);
        }
        other => panic!("Expected Delegated, got {other:?}"),
    }
    assert_eq!(
        browser.opened(),
        vec![format!("http://127.0.0.1:{}/", running.port())]
    );

    // THEN: Nothing was bound and the marker is untouched
    assert!(!verify(scan_port, HANDSHAKE_TIMEOUT).await);
    assert_eq!(marker.read(), Some(running.port()));

    running.shutdown();
    running.stopped().await.expect("Clean shutdown");
}

/// **VALUE**: A marker left behind by a crashed instance is discarded and replaced.
///
/// **BUG THIS CATCHES**: Would catch the launcher trusting the marker without a
/// handshake and "delegating" to a port nobody serves.
#[tokio::test]
async fn given_stale_marker_when_launched_then_rebinds_and_rewrites_marker() {
    // GIVEN: A marker naming a port nothing listens on
    let dir = TempDir::new().expect("tempdir");
    let marker = PortMarker::new(dir.path().join("rollcall.port"));
    let start = free_port_run(2);
    let dead_port = start + 1;
    marker.write(dead_port).expect("write stale marker");

    let browser = RecordingBrowser::default();

    // WHEN: Launching
    let (stop_tx, task) = launch(coordinator(&dir, range(start, 1), &browser));

    // THEN: A new instance serves the range and the marker names it
    assert!(wait_for_marker(&marker, start).await, "Marker should be rewritten");
    assert!(verify(start, HANDSHAKE_TIMEOUT).await);

    stop_tx.send(()).expect("coordinator still running");
    let outcome = task.await.expect("join").expect("clean launch");
    assert!(matches!(outcome, LaunchOutcome::Served(_)));
    assert!(!marker.path().exists());
}

/// **VALUE**: With the marker lost, an instance elsewhere in the range is still found.
#[tokio::test]
async fn given_missing_marker_and_running_instance_in_range_when_launched_then_delegates() {
    // GIVEN: An instance on the second port of the range and no marker
    let dir = TempDir::new().expect("tempdir");
    let start = free_port_run(2);
    let mut running = test_server(dir.path())
        .start(start + 1)
        .await
        .expect("bind second port");
    let browser = RecordingBrowser::default();

    // WHEN: Launching
    let outcome = coordinator(&dir, range(start, 2), &browser)
        .run_until(std::future::pending())
        .await
        .expect("delegation succeeds");

    // THEN: The scan delegates to it and does not bind the free first port
    assert_eq!(outcome.instance().port, start + 1);
    assert!(matches!(outcome, LaunchOutcome::Delegated(_)));
    assert!(!verify(start, HANDSHAKE_TIMEOUT).await);
    assert_eq!(PortMarker::new(dir.path().join("rollcall.port")).read(), None);

    running.shutdown();
    running.stopped().await.expect("Clean shutdown");
}

/// **VALUE**: A range fully held by other services ends in a clear fatal error.
///
/// **WHY THIS MATTERS**: The user must learn which ports to free; the launcher must
/// not silently pick a port outside the range.
#[tokio::test]
async fn given_range_held_by_foreign_services_when_launched_then_fails_with_ports_exhausted() {
    // GIVEN: The only port in range belongs to an unrelated HTTP service
    let dir = TempDir::new().expect("tempdir");
    let foreign = MockServer::start().await;
    let port = foreign.address().port();
    let browser = RecordingBrowser::default();

    // WHEN: Launching
    let result = coordinator(&dir, range(port, 1), &browser)
        .run_until(std::future::pending())
        .await;

    // THEN: Exhaustion is reported with the range, nothing is recorded or opened
    match result {
        Err(CoordinatorError::PortsExhausted { range: reported, .. }) => {
            assert_eq!(reported, range(port, 1));
        }
        other => panic!("Expected PortsExhausted, got {other:?}"),
    }
    assert!(!dir.path().join("rollcall.port").exists());
    assert!(browser.opened().is_empty());
}

/// **VALUE**: A second launch while the first is serving delegates to it.
///
/// **WHY THIS MATTERS**: This is the single-instance guarantee end to end: two
/// coordinators, one server.
#[tokio::test]
async fn given_serving_instance_when_second_launch_runs_then_second_delegates() {
    // GIVEN: A first launch serving from a shared data directory
    let dir = TempDir::new().expect("tempdir");
    let start = free_port_run(2);
    let marker = PortMarker::new(dir.path().join("rollcall.port"));
    let first_browser = RecordingBrowser::default();
    let (stop_tx, first) = launch(coordinator(&dir, range(start, 2), &first_browser));
    assert!(wait_for_marker(&marker, start).await);

    // WHEN: A second launch runs against the same directory
    let second_browser = RecordingBrowser::default();
    let outcome = coordinator(&dir, range(start, 2), &second_browser)
        .run_until(std::future::pending())
        .await
        .expect("second launch");

    // THEN: It delegates to the first, which keeps serving and keeps its marker
    assert!(matches!(outcome, LaunchOutcome::Delegated(_)));
    assert_eq!(outcome.instance().port, start);
    assert_eq!(
        second_browser.opened(),
        vec![format!("http://127.0.0.1:{start}/")]
    );
    assert!(!verify(start + 1, HANDSHAKE_TIMEOUT).await, "No second server");
    assert_eq!(marker.read(), Some(start));

    stop_tx.send(()).expect("first launch still running");
    first.await.expect("join").expect("clean launch");
    assert!(!marker.path().exists());
}

/// **VALUE**: After the serving instance stops, the next launch starts a fresh one.
#[tokio::test]
async fn given_previous_instance_shut_down_when_relaunched_then_serves_again() {
    let dir = TempDir::new().expect("tempdir");
    let start = free_port_run(1);
    let marker = PortMarker::new(dir.path().join("rollcall.port"));

    let (stop_tx, task) = launch(coordinator(&dir, range(start, 1), &RecordingBrowser::default()));
    assert!(wait_for_marker(&marker, start).await);
    stop_tx.send(()).expect("running");
    task.await.expect("join").expect("clean launch");

    let (stop_tx, task) = launch(coordinator(&dir, range(start, 1), &RecordingBrowser::default()));
    assert!(wait_for_marker(&marker, start).await, "Relaunch should serve again");
    stop_tx.send(()).expect("running");
    let outcome = task.await.expect("join").expect("clean launch");

    assert!(matches!(outcome, LaunchOutcome::Served(_)));
}

/// **VALUE**: Losing the port between scan and bind once is recovered by rescanning.
///
/// **WHY THIS MATTERS**: Two launchers started together can both see the same port
/// free. The loser must retry instead of reporting a fatal error to the user.
///
/// **BUG THIS CATCHES**: Would catch a bind failure being treated as fatal on the
/// first attempt, or the rescan being skipped.
#[tokio::test]
async fn given_bind_lost_once_when_launched_then_rescans_and_serves() {
    // GIVEN: A server whose first bind attempt loses the race
    let dir = TempDir::new().expect("tempdir");
    let start = free_port_run(1);
    let marker = PortMarker::new(dir.path().join("rollcall.port"));
    let (server, calls) = ContestedServer::new(&dir, 1);
    let browser = RecordingBrowser::default();

    // WHEN: Launching, and stopping once the instance is recorded
    let outcome = coordinator_with(&dir, range(start, 1), &browser, server)
        .run_until(async {
            wait_for_marker(&marker, start).await;
        })
        .await
        .expect("second attempt serves");

    // THEN: The second attempt served the port
    match outcome {
        LaunchOutcome::Served(instance) => assert_eq!(instance.port, start),
        other => panic!("Expected Served, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!marker.path().exists());
}

/// **VALUE**: Repeated bind failures end the launch without leaving a marker behind.
///
/// **BUG THIS CATCHES**: Would catch an endless rescan loop, or a marker written for
/// a port this process never bound.
#[tokio::test]
async fn given_bind_lost_twice_when_launched_then_fails_without_marker() {
    // GIVEN: A server that loses every race the coordinator allows
    let dir = TempDir::new().expect("tempdir");
    let start = free_port_run(1);
    let (server, calls) = ContestedServer::new(&dir, 2);
    let browser = RecordingBrowser::default();

    // WHEN: Launching
    let result = coordinator_with(&dir, range(start, 1), &browser, server)
        .run_until(std::future::pending())
        .await;

    // THEN: The launch fails with the bind error after two attempts
    match result {
        Err(CoordinatorError::BindFailed { source, .. }) => {
            assert!(matches!(source, ServerError::Bind { port, .. } if port == start));
        }
        other => panic!("Expected BindFailed, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // THEN: Nothing is recorded or opened
    assert!(!dir.path().join("rollcall.port").exists());
    assert!(browser.opened().is_empty());
}

/// **VALUE**: Launchers started at the same moment end up with exactly one server.
///
/// **WHY THIS MATTERS**: Users double-click the launcher. Every process races the
/// same scan, and only one of them may own the roster.
///
/// **BUG THIS CATCHES**: Would catch two launchers both serving (a port outside the
/// winner's), or losers failing instead of handing off to the winner.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_simultaneous_launches_when_all_run_then_one_serves_and_rest_delegate() {
    // GIVEN: Four launchers sharing a data directory and a two-port range
    let dir = TempDir::new().expect("tempdir");
    let start = free_port_run(2);
    let marker = PortMarker::new(dir.path().join("rollcall.port"));

    // WHEN: All of them start at once
    let (stops, tasks): (Vec<_>, Vec<_>) = (0..4)
        .map(|_| launch(coordinator(&dir, range(start, 2), &RecordingBrowser::default())))
        .unzip();

    // THEN: One instance is recorded and every other launcher returns
    assert!(
        wait_for(|| marker.read().is_some(), WAIT).await,
        "One launcher should record its port"
    );
    assert!(
        wait_for(|| tasks.iter().filter(|task| task.is_finished()).count() == 3, WAIT).await,
        "All but the serving launcher should hand off and exit"
    );

    for stop in stops {
        let _ = stop.send(());
    }

    let mut served = Vec::new();
    let mut delegated = Vec::new();
    for task in tasks {
        match task.await.expect("join").expect("launch succeeds") {
            LaunchOutcome::Served(instance) => served.push(instance.port),
            LaunchOutcome::Delegated(instance) => delegated.push(instance.port),
        }
    }

    // THEN: Exactly one served, the rest delegated to it
    assert_eq!(served.len(), 1, "Exactly one launcher should serve");
    assert_eq!(delegated.len(), 3);
    assert!(delegated.iter().all(|port| *port == served[0]));
    assert!(!marker.path().exists());
}
