//! Instance registry: the port marker file.
//!
//! The marker is the only durable coordination state. It holds the decimal
//! port of the serving instance and nothing else. Readers treat anything
//! unusable (missing, empty, non-numeric, unreadable) as "no marker"; the
//! range scan covers for it.

use crate::error::registry::RegistryError;

use common::ErrorLocation;

use std::fs::{File, remove_file, rename};
use std::io::{ErrorKind, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

/// Handle on the marker file, owned by the coordinator.
#[derive(Debug, Clone)]
pub struct PortMarker {
    path: PathBuf,
}

impl PortMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted port, or `None` when there is no usable marker.
    ///
    /// Never fails: I/O and parse problems are logged and reported as absence.
    pub fn read(&self) -> Option<u16> {
        match self.try_read() {
            Ok(port) => port,
            Err(e) => {
                warn!("Ignoring unusable port marker: {e}");
                None
            }
        }
    }

    #[track_caller]
    fn try_read(&self) -> Result<Option<u16>, RegistryError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No port marker at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(RegistryError::Read {
                    location: ErrorLocation::from(Location::caller()),
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        match parse_marker(&contents) {
            Some(port) => {
                debug!("Port marker names port {port}");
                Ok(Some(port))
            }
            None => Err(RegistryError::Parse {
                location: ErrorLocation::from(Location::caller()),
                path: self.path.clone(),
                reason: format!("'{}' is not a port number", contents.trim()),
            }),
        }
    }

    /// Persist `port`, replacing any previous marker.
    ///
    /// The value is written to a sibling temp file, flushed to disk and renamed
    /// into place, so a crash leaves either the old or the new marker.
    #[track_caller]
    pub fn write(&self, port: u16) -> Result<(), RegistryError> {
        let temp_path = self.temp_path();

        let write_temp = || -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(port.to_string().as_bytes())?;
            file.sync_all()
        };

        if let Err(e) = write_temp() {
            let _ = remove_file(&temp_path);
            return Err(RegistryError::Write {
                location: ErrorLocation::from(Location::caller()),
                path: temp_path,
                source: e,
            });
        }

        rename(&temp_path, &self.path).map_err(|e| {
            let _ = remove_file(&temp_path);
            RegistryError::Write {
                location: ErrorLocation::from(Location::caller()),
                path: self.path.clone(),
                source: e,
            }
        })?;

        info!("Port marker {} now names port {port}", self.path.display());
        Ok(())
    }

    /// Delete the marker. Removing an absent marker succeeds.
    #[track_caller]
    pub fn remove(&self) -> Result<(), RegistryError> {
        match remove_file(&self.path) {
            Ok(()) => {
                info!("Removed port marker {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Port marker {} already absent", self.path.display());
                Ok(())
            }
            Err(e) => Err(RegistryError::Remove {
                location: ErrorLocation::from(Location::caller()),
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "marker".to_string());

        self.path
            .with_file_name(format!("{file_name}.{}.tmp", std::process::id()))
    }
}

/// Decimal port in `[1, 65535]`, surrounding whitespace ignored.
pub(crate) fn parse_marker(contents: &str) -> Option<u16> {
    contents
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
}
