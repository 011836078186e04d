use rollcall::environment::check as EnvironmentCheck;
use rollcall::error::RollcallError;
use rollcall::logger::initialize as LoggerInitialize;

use instance_core::browser::{BrowserLauncher, NoBrowser, SystemBrowser};
use instance_core::config::AppConfig;
use instance_core::coordinator::{Coordinator, LaunchOutcome};
use instance_core::registry::PortMarker;
use instance_core::roster::RosterStore;
use instance_core::server::RollCallServer;

use common::ErrorLocation;

use std::env::current_dir;
use std::panic::Location;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use log::{debug, error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(LaunchOutcome::Delegated(instance)) => {
            info!("RollCall is already running at {}", instance.base_url);
            ExitCode::SUCCESS
        }
        Ok(LaunchOutcome::Served(instance)) => {
            info!("RollCall on {} stopped", instance.base_url);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<LaunchOutcome, RollcallError> {
    let data_dir = current_dir().map_err(|e| RollcallError::Rollcall {
        message: format!("Failed to resolve working directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // .env may set the log level, so it loads before the logger and reports after
    let dotenv = dotenvy::dotenv();
    LoggerInitialize(&data_dir)?;
    info!("RollCall launcher starting");

    match dotenv {
        Ok(path) => info!("Loaded .env from: {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env: {e}"),
    }

    let config = load_config(&data_dir);
    EnvironmentCheck(&config, &data_dir).await?;

    let server = RollCallServer::new(
        RosterStore::new(config.roster_path(&data_dir)),
        config.static_dir(&data_dir),
    );
    let marker = PortMarker::new(config.marker_path(&data_dir));
    let launcher: Arc<dyn BrowserLauncher> = if config.browser.open_on_start {
        Arc::new(SystemBrowser)
    } else {
        Arc::new(NoBrowser)
    };

    Coordinator::new(&config, marker, server, launcher)
        .run()
        .await
        .map_err(|e| RollcallError::Launch {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Config file plus environment overrides; anything unusable falls back to defaults.
fn load_config(data_dir: &Path) -> AppConfig {
    let config = AppConfig::load(data_dir).unwrap_or_else(|e| {
        warn!("Using default config: {e}");
        AppConfig::default()
    });

    let mut overridden = config.clone();
    match overridden.apply_env_overrides(|key| std::env::var(key).ok()) {
        Ok(()) => overridden,
        Err(e) => {
            warn!("Ignoring environment overrides: {e}");
            config
        }
    }
}
