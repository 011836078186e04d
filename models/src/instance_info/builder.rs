use crate::error::model_error::ModelError;
use crate::{ErrorLocation, InstanceInfo};

use std::panic::Location;

/// Builder for validated [`InstanceInfo`] values.
#[derive(Debug, Default)]
pub struct InstanceInfoBuilder {
    port: Option<u16>,
    base_url: Option<String>,
    owned: Option<bool>,
}

impl InstanceInfoBuilder {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_owned(mut self, owned: bool) -> Self {
        self.owned = Some(owned);
        self
    }

    #[track_caller]
    pub fn build(self) -> Result<InstanceInfo, ModelError> {
        let port = self.port.ok_or_else(|| ModelError::Validation {
            message: String::from("Port is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if port == 0 {
            return Err(ModelError::Validation {
                message: String::from("Port must be non-zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let base_url = self.base_url.ok_or_else(|| ModelError::Validation {
            message: String::from("Base URL is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if base_url.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Base URL cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !base_url.starts_with("http://") {
            return Err(ModelError::Validation {
                message: format!("Invalid base URL format: {base_url}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !base_url.ends_with(&format!(":{port}")) {
            return Err(ModelError::Validation {
                message: format!("Base URL {base_url} does not match port {port}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let owned = self.owned.ok_or_else(|| ModelError::Validation {
            message: String::from("Owned is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(InstanceInfo {
            port,
            base_url,
            owned,
        })
    }
}
