//! Roster persistence: the list of student names behind the web UI.
//!
//! Names live in a JSON array on disk. The list is unique, capped at
//! [`MAX_STUDENTS`] entries, and every name is trimmed and at most
//! [`MAX_NAME_CHARS`] characters. Read-modify-write cycles are serialized by
//! an async mutex so concurrent API calls cannot lose updates.

use crate::error::roster::RosterError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rand::seq::SliceRandom;
use tokio::sync::Mutex;

pub const MAX_STUDENTS: usize = 100;
pub const MAX_NAME_CHARS: usize = 50;

pub struct RosterStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the roster file with an empty list if it does not exist yet.
    pub async fn ensure_exists(&self) -> Result<bool, RosterError> {
        if tokio::fs::metadata(&self.path).await.is_ok() {
            return Ok(false);
        }

        self.save(&[]).await?;
        info!("Initialized roster file {}", self.path.display());
        Ok(true)
    }

    /// Current names. A missing or corrupt file reads as an empty roster.
    pub async fn load(&self) -> Vec<String> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                error!("Failed to read roster {}: {e}", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&contents) {
            Ok(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(name) => Some(name),
                    other => {
                        warn!("Skipping non-string roster entry: {other}");
                        None
                    }
                })
                .collect(),
            Ok(_) => {
                warn!("Roster {} is not a JSON array", self.path.display());
                Vec::new()
            }
            Err(e) => {
                error!("Failed to parse roster {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    /// Add a name and return the updated roster.
    pub async fn add(&self, raw_name: &str) -> Result<Vec<String>, RosterError> {
        let _guard = self.write_lock.lock().await;
        let mut students = self.load().await;

        if students.len() >= MAX_STUDENTS {
            return Err(RosterError::Capacity {
                message: format!("Roster is full ({MAX_STUDENTS} students)"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let name = validate_name(raw_name)?;

        if students.iter().any(|existing| existing == &name) {
            return Err(RosterError::Duplicate {
                message: format!("Student '{name}' already exists"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        students.push(name.clone());
        self.save(&students).await?;

        info!("Added student: {name}");
        Ok(students)
    }

    /// Remove an exact name and return the updated roster.
    pub async fn remove(&self, name: &str) -> Result<Vec<String>, RosterError> {
        let _guard = self.write_lock.lock().await;
        let mut students = self.load().await;

        let Some(index) = students.iter().position(|existing| existing == name) else {
            return Err(RosterError::NotFound {
                message: format!("Student '{name}' does not exist"),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        students.remove(index);
        self.save(&students).await?;

        info!("Removed student: {name}");
        Ok(students)
    }

    /// Uniformly random name from the roster.
    pub async fn pick_random(&self) -> Result<String, RosterError> {
        let students = self.load().await;

        let chosen = students
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| RosterError::Empty {
                message: String::from("There are no students to pick from"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("Picked student: {chosen}");
        Ok(chosen)
    }

    /// Pretty JSON, non-ASCII kept verbatim, written via temp file + rename.
    async fn save(&self, students: &[String]) -> Result<(), RosterError> {
        let json = serde_json::to_string_pretty(students).map_err(|e| RosterError::Persist {
            message: format!("Failed to serialize roster: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })?;

        let temp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&temp_path, json).await.map_err(|e| RosterError::Persist {
            message: format!("Failed to write {}: {e}", temp_path.display()),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })?;

        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| RosterError::Persist {
            message: format!("Failed to replace {}: {e}", self.path.display()),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })
    }
}

#[track_caller]
pub(crate) fn validate_name(raw_name: &str) -> Result<String, RosterError> {
    let name = raw_name.trim();

    if name.is_empty() {
        return Err(RosterError::Validation {
            message: String::from("Student name cannot be empty"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if name.chars().count() > MAX_NAME_CHARS {
        return Err(RosterError::Validation {
            message: format!("Student name is too long (at most {MAX_NAME_CHARS} characters)"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(name.to_string())
}
