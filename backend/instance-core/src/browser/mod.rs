//! Browser hand-off.
//!
//! Opening the UI is a side effect outside the coordination critical path:
//! a delegating launch opens the running instance right away, a new instance
//! schedules a one-shot task that waits for its own handshake and then opens.
//! Failures (no graphical session, missing opener) are logged and dropped.

use crate::base_url;
use crate::discovery::handshake::verify;
use crate::error::browser::BrowserError;

use common::ErrorLocation;

use std::panic::Location;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace, warn};
use tokio::process::Command as TokioCommand;
use tokio::spawn as TokioSpawn;
use tokio::task::JoinHandle;
use tokio::time::sleep as TokioSleep;

pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> Result<(), BrowserError>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<(), BrowserError> {
        let mut command = build_open_command(url);

        match command.spawn() {
            Ok(child) => {
                info!("Opened browser at {url} (PID: {:?})", child.id());
                Ok(())
            }
            Err(e) => Err(BrowserError::Spawn {
                message: format!("Failed to launch browser for {url}: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            }),
        }
    }
}

/// Launcher used when opening the browser is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBrowser;

impl BrowserLauncher for NoBrowser {
    fn open(&self, url: &str) -> Result<(), BrowserError> {
        info!("Browser launch disabled, application available at {url}");
        Ok(())
    }
}

#[cfg(target_os = "windows")]
pub(crate) fn build_open_command(url: &str) -> TokioCommand {
    let mut cmd = TokioCommand::new("cmd");
    cmd.args(["/C", "start", ""]).arg(url);
    cmd.stdout(Stdio::null()).stderr(Stdio::null());
    cmd
}

#[cfg(target_os = "macos")]
pub(crate) fn build_open_command(url: &str) -> TokioCommand {
    let mut cmd = TokioCommand::new("open");
    cmd.arg(url).stdout(Stdio::null()).stderr(Stdio::null());
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub(crate) fn build_open_command(url: &str) -> TokioCommand {
    let mut cmd = TokioCommand::new("xdg-open");
    cmd.arg(url).stdout(Stdio::null()).stderr(Stdio::null());
    cmd
}

/// Open the instance on `port` right away, logging instead of failing.
pub fn open_now(launcher: &dyn BrowserLauncher, port: u16) {
    let url = format!("{}/", base_url(port));

    if let Err(e) = launcher.open(&url) {
        warn!("Could not open browser: {e}");
    }
}

/// Timing for the deferred browser launch of a freshly started instance.
#[derive(Debug, Clone, Copy)]
pub struct BrowserSchedule {
    pub delay: Duration,
    pub ready_timeout: Duration,
    pub handshake_timeout: Duration,
}

/// Fire-and-forget: after `delay`, wait for the instance on `port` to answer
/// its handshake, then open it. The returned handle may be ignored.
pub fn schedule_open(
    launcher: Arc<dyn BrowserLauncher>,
    port: u16,
    schedule: BrowserSchedule,
) -> JoinHandle<()> {
    debug!("Browser launch scheduled in {:?}", schedule.delay);

    TokioSpawn(async move {
        TokioSleep(schedule.delay).await;

        if let Err(e) = wait_until_ready(port, schedule).await {
            warn!("Not opening browser: {e}");
            return;
        }

        open_now(launcher.as_ref(), port);
    })
}

async fn wait_until_ready(port: u16, schedule: BrowserSchedule) -> Result<(), BrowserError> {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(schedule.ready_timeout),
        ..Default::default()
    };

    loop {
        if verify(port, schedule.handshake_timeout).await {
            return Ok(());
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Instance on port {port} not ready, retrying after {duration:?}");
                TokioSleep(duration).await;
            }
            None => {
                return Err(BrowserError::Timeout {
                    message: format!(
                        "Instance on port {port} did not answer its handshake within {:?}",
                        schedule.ready_timeout
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }
}
