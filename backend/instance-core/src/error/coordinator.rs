use crate::error::server::ServerError;

use common::ErrorLocation;
use models::{ModelError, PortRange};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CoordinatorError {
    #[error("Ports Exhausted Error: {message} {location}")]
    PortsExhausted {
        message: String,
        range: PortRange,
        location: ErrorLocation,
    },

    #[error("Bind Error: {message} {location}")]
    BindFailed {
        message: String,
        location: ErrorLocation,
        #[source]
        source: ServerError,
    },

    #[error("Server Error: {message} {location}")]
    Server {
        message: String,
        location: ErrorLocation,
        #[source]
        source: ServerError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}
