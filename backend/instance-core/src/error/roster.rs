use common::ErrorLocation;

use std::error::Error as StdError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RosterError {
    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Duplicate Error: {message} {location}")]
    Duplicate {
        message: String,
        location: ErrorLocation,
    },

    #[error("Capacity Error: {message} {location}")]
    Capacity {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not Found Error: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("Empty Roster Error: {message} {location}")]
    Empty {
        message: String,
        location: ErrorLocation,
    },

    #[error("Persist Error: {message} {location}")]
    Persist {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl RosterError {
    /// Human-readable message without the source location, safe to send to clients.
    pub fn message(&self) -> &str {
        match self {
            RosterError::Validation { message, .. }
            | RosterError::Duplicate { message, .. }
            | RosterError::Capacity { message, .. }
            | RosterError::NotFound { message, .. }
            | RosterError::Empty { message, .. }
            | RosterError::Persist { message, .. } => message,
        }
    }
}
