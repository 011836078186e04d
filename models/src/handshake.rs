//! Identity handshake payload.
//!
//! The launcher asks whatever listens on a candidate port for `GET /ping` and
//! only trusts the answer if the `app` field is exactly [`APP_IDENTIFIER`].

use serde::{Deserialize, Serialize};

/// Token identifying this application regardless of the port it occupies.
pub const APP_IDENTIFIER: &str = "RollCallPy";

/// Path of the handshake endpoint.
pub const HANDSHAKE_PATH: &str = "/ping";

pub const STATUS_OK: &str = "ok";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub app: String,
    pub status: String,
}

impl PingResponse {
    /// Payload served by a healthy instance.
    pub fn ok() -> Self {
        Self {
            app: APP_IDENTIFIER.to_string(),
            status: STATUS_OK.to_string(),
        }
    }

    /// Exact, case-sensitive identifier comparison.
    pub fn is_from_this_application(&self) -> bool {
        self.app == APP_IDENTIFIER
    }
}
