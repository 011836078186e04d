//! Start-up environment check.
//!
//! Makes sure the data directory has what the server needs and logs what it
//! found, so a missing sound file or an unwritable directory shows up in the
//! log before the first request does.

use crate::error::RollcallError;

use instance_core::config::AppConfig;
use instance_core::roster::RosterStore;
use instance_core::server::ROUTES;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{info, warn};

/// Sound cues the UI plays, expected in the static directory.
pub const AUDIO_FILES: &[&str] = &["roll.mp3", "select.mp3", "click.mp3"];

/// What the check found and created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub static_dir: PathBuf,
    pub static_dir_created: bool,
    pub roster_path: PathBuf,
    pub roster_created: bool,
    pub missing_audio: Vec<String>,
}

/// Prepare and describe the data directory.
///
/// Creates the static directory and an empty roster when missing. Missing
/// audio files are only reported; the UI works without sound.
pub async fn check(config: &AppConfig, data_dir: &Path) -> Result<EnvironmentReport, RollcallError> {
    info!("Working directory: {}", data_dir.display());

    let static_dir = config.static_dir(data_dir);
    let static_dir_created = !tokio::fs::metadata(&static_dir)
        .await
        .is_ok_and(|metadata| metadata.is_dir());
    if static_dir_created {
        tokio::fs::create_dir_all(&static_dir).await.map_err(|e| RollcallError::Environment {
            message: format!(
                "Failed to create static directory {}: {e}",
                static_dir.display()
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;
        info!("Created static directory: {}", static_dir.display());
    } else {
        info!("Static directory: {}", static_dir.display());
    }

    let roster = RosterStore::new(config.roster_path(data_dir));
    let roster_created = roster.ensure_exists().await.map_err(|e| RollcallError::Environment {
        message: format!("Roster file unusable: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;
    info!(
        "Roster file: {} ({} students)",
        roster.path().display(),
        roster.load().await.len()
    );

    let mut missing_audio = Vec::new();
    for name in AUDIO_FILES {
        let path = static_dir.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {
                info!("Audio file {name}: {} bytes", metadata.len());
            }
            _ => {
                warn!("Audio file {name} not found at {}", path.display());
                missing_audio.push(name.to_string());
            }
        }
    }

    info!("Registered routes:");
    for route in ROUTES {
        info!("  {route}");
    }

    Ok(EnvironmentReport {
        static_dir,
        static_dir_created,
        roster_path: roster.path().to_path_buf(),
        roster_created,
        missing_audio,
    })
}
