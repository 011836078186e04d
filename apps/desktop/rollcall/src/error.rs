use common::ErrorLocation;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the launcher binary before or around the coordinator.
///
/// Library errors from `instance-core` are flattened into these with their
/// message, so the final diagnostic is a single line with a location.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum RollcallError {
    /// Error from this App
    #[error("Rollcall Error: {message} {location}")]
    Rollcall {
        message: String,
        location: ErrorLocation,
    },

    /// Data directory or assets unusable
    #[error("Environment Error: {message} {location}")]
    Environment {
        message: String,
        location: ErrorLocation,
    },

    /// Coordinator ended in FATAL
    #[error("Launch Error: {message} {location}")]
    Launch {
        message: String,
        location: ErrorLocation,
    },
}
