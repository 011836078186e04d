use crate::ErrorLocation;
use crate::error::model_error::ModelError;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::ops::Range;
use std::panic::Location;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT_RANGE_START: u16 = 5000;
pub const DEFAULT_PORT_RANGE_END: u16 = 5050;

/// Half-open range `[start, end)` of TCP ports a new instance may bind.
///
/// Scanned in ascending order so the chosen port is reproducible when the
/// machine is otherwise idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    #[track_caller]
    pub fn new(start: u16, end: u16) -> Result<Self, ModelError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Port 0 is rejected because binding it asks the OS for any port, which
    /// would defeat the deterministic scan.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.start == 0 {
            return Err(ModelError::PortRange {
                message: String::from("Port range cannot start at 0"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.end <= self.start {
            return Err(ModelError::PortRange {
                message: format!(
                    "Port range end ({}) must be greater than start ({})",
                    self.end, self.start
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn len(&self) -> usize {
        usize::from(self.end.saturating_sub(self.start))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports().contains(&port)
    }

    pub fn ports(&self) -> Range<u16> {
        self.start..self.end
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_PORT_RANGE_START,
            end: DEFAULT_PORT_RANGE_END,
        }
    }
}

impl Display for PortRange {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "[{}, {})", self.start, self.end)
    }
}
