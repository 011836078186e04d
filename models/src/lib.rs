//! Domain models for the RollCall launcher.
//!
//! Plain data shared between the coordination core and the launcher binary:
//! the handshake payload both sides agree on, the candidate port range, and
//! the description of the instance a launch ended up with.

pub mod error;
pub mod handshake;
pub mod instance_info;
pub mod port_range;

pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use handshake::{APP_IDENTIFIER, HANDSHAKE_PATH, PingResponse, STATUS_OK};
pub use instance_info::InstanceInfo;
pub use instance_info::builder::InstanceInfoBuilder;
pub use port_range::PortRange;

#[cfg(test)]
mod tests;
