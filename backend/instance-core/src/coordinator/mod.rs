//! Launch coordination.
//!
//! Every launch walks the same state machine:
//!
//! ```text
//! START -> CHECK_MARKER -> (DELEGATE | SCAN_RANGE) -> (DELEGATE | BIND_NEW)
//!       -> SERVING -> SHUTTING_DOWN -> TERMINATED
//! ```
//!
//! with `FATAL` reachable from `SCAN_RANGE` (no free port, no instance) and
//! from `BIND_NEW` (bind lost twice). Decisions are taken sequentially on the
//! calling task; the only mutual exclusion between racing launches is the
//! listener bind itself.

mod guard;
mod signal;

pub use signal::shutdown_signal;

use crate::base_url;
use crate::browser::{BrowserLauncher, BrowserSchedule, open_now, schedule_open};
use crate::config::{AppConfig, BrowserConfig, PortConfig};
use crate::discovery::allocator::{Survey, survey};
use crate::discovery::handshake::verify;
use crate::error::coordinator::CoordinatorError;
use crate::error::server::ServerError;
use crate::registry::PortMarker;
use crate::server::{AppServer, ServerHandle};

use guard::MarkerGuard;

use common::ErrorLocation;
use models::{InstanceInfo, InstanceInfoBuilder};

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::future::Future;
use std::panic::Location;
use std::pin::{Pin, pin};
use std::sync::Arc;

use log::{debug, error, info, warn};

/// Initial attempt plus one re-scan after losing a bind race.
const MAX_BIND_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Start,
    CheckMarker,
    ScanRange,
    Delegate,
    BindNew,
    Serving,
    ShuttingDown,
    Terminated,
    Fatal,
}

impl Display for LaunchState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            LaunchState::Start => "START",
            LaunchState::CheckMarker => "CHECK_MARKER",
            LaunchState::ScanRange => "SCAN_RANGE",
            LaunchState::Delegate => "DELEGATE",
            LaunchState::BindNew => "BIND_NEW",
            LaunchState::Serving => "SERVING",
            LaunchState::ShuttingDown => "SHUTTING_DOWN",
            LaunchState::Terminated => "TERMINATED",
            LaunchState::Fatal => "FATAL",
        };
        formatter.write_str(name)
    }
}

/// How a successful launch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Another instance was already serving; control was handed to it.
    Delegated(InstanceInfo),
    /// This process served the instance until it was stopped.
    Served(InstanceInfo),
}

impl LaunchOutcome {
    pub fn instance(&self) -> &InstanceInfo {
        match self {
            LaunchOutcome::Delegated(instance) | LaunchOutcome::Served(instance) => instance,
        }
    }
}

pub struct Coordinator<S: AppServer> {
    ports: PortConfig,
    browser: BrowserConfig,
    marker: PortMarker,
    server: S,
    launcher: Arc<dyn BrowserLauncher>,
}

impl<S: AppServer> Coordinator<S> {
    pub fn new(
        config: &AppConfig,
        marker: PortMarker,
        server: S,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Self {
        Self {
            ports: config.ports.clone(),
            browser: config.browser.clone(),
            marker,
            server,
            launcher,
        }
    }

    pub fn marker(&self) -> &PortMarker {
        &self.marker
    }

    /// Run the launch, serving until SIGINT/SIGTERM if this process wins.
    pub async fn run(&self) -> Result<LaunchOutcome, CoordinatorError> {
        self.run_until(shutdown_signal()).await
    }

    /// Run the launch; a served instance stops when `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<LaunchOutcome, CoordinatorError>
    where
        F: Future<Output = ()> + Send,
    {
        let mut shutdown = pin!(shutdown);

        enter(LaunchState::Start);
        enter(LaunchState::CheckMarker);

        if let Some(port) = self.check_marker().await {
            return self.delegate(port);
        }

        let range = self.ports.range;
        let mut attempt = 0;

        loop {
            attempt += 1;
            enter(LaunchState::ScanRange);

            let port = match survey(
                range,
                self.ports.scan_probe_timeout(),
                self.ports.handshake_timeout(),
            )
            .await
            {
                Survey::Existing(port) => return self.delegate(port),
                Survey::Free(port) => port,
                Survey::Exhausted => {
                    enter(LaunchState::Fatal);
                    let message = format!(
                        "No available port in {range} and no running instance found; \
                         free a port in that range and try again"
                    );
                    error!("{message}");
                    return Err(CoordinatorError::PortsExhausted {
                        message,
                        range,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            };

            enter(LaunchState::BindNew);
            info!("Starting new instance on port {port}");

            match self.server.start(port).await {
                Ok(handle) => return self.serve(handle, shutdown.as_mut()).await,
                Err(e @ ServerError::Bind { .. }) if attempt < MAX_BIND_ATTEMPTS => {
                    warn!("Lost port {port} between scan and bind, rescanning: {e}");
                }
                Err(e) => {
                    enter(LaunchState::Fatal);
                    error!("Could not start an instance: {e}");
                    return Err(CoordinatorError::BindFailed {
                        message: format!("Failed to bind port {port} after {attempt} attempt(s)"),
                        location: ErrorLocation::from(Location::caller()),
                        source: e,
                    });
                }
            }
        }
    }

    /// Port of a live instance named by the marker; a stale marker is removed.
    async fn check_marker(&self) -> Option<u16> {
        let port = self.marker.read()?;

        if verify(port, self.ports.marker_timeout()).await {
            info!("Port marker points at a running instance on port {port}");
            return Some(port);
        }

        info!("Port marker names port {port} but no instance answers there, discarding it");
        if let Err(e) = self.marker.remove() {
            warn!("Failed to discard stale port marker: {e}");
        }

        None
    }

    fn delegate(&self, port: u16) -> Result<LaunchOutcome, CoordinatorError> {
        enter(LaunchState::Delegate);

        let instance = InstanceInfoBuilder::default()
            .with_port(port)
            .with_base_url(base_url(port))
            .with_owned(false)
            .build()?;

        info!("Application already running at {}, handing off", instance.base_url);
        open_now(self.launcher.as_ref(), port);

        enter(LaunchState::Terminated);
        Ok(LaunchOutcome::Delegated(instance))
    }

    async fn serve<F>(
        &self,
        mut handle: ServerHandle,
        mut shutdown: Pin<&mut F>,
    ) -> Result<LaunchOutcome, CoordinatorError>
    where
        F: Future<Output = ()> + Send,
    {
        let port = handle.port();
        let marker_guard = MarkerGuard::new(&self.marker);

        if let Err(e) = self.marker.write(port) {
            warn!("Could not record port marker, later launches will rely on the range scan: {e}");
        }

        let instance = InstanceInfoBuilder::default()
            .with_port(port)
            .with_base_url(base_url(port))
            .with_owned(true)
            .build()?;

        enter(LaunchState::Serving);
        info!("Application running at {}", instance.base_url);

        let browser_task = schedule_open(
            Arc::clone(&self.launcher),
            port,
            BrowserSchedule {
                delay: self.browser.delay(),
                ready_timeout: self.browser.ready_timeout(),
                handshake_timeout: self.ports.marker_timeout(),
            },
        );

        let finished = tokio::select! {
            result = handle.stopped() => Some(result),
            () = shutdown.as_mut() => None,
        };

        enter(LaunchState::ShuttingDown);

        let result = match finished {
            Some(result) => result,
            None => {
                handle.shutdown();
                handle.stopped().await
            }
        };

        browser_task.abort();
        drop(marker_guard);
        enter(LaunchState::Terminated);

        match result {
            Ok(()) => {
                info!("Instance on port {port} shut down cleanly");
                Ok(LaunchOutcome::Served(instance))
            }
            Err(e) => {
                error!("Instance on port {port} terminated with an error: {e}");
                Err(CoordinatorError::Server {
                    message: format!("Server on port {port} did not shut down cleanly"),
                    location: ErrorLocation::from(Location::caller()),
                    source: e,
                })
            }
        }
    }
}

fn enter(state: LaunchState) {
    debug!("Launch state: {state}");
}
