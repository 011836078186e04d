pub mod builder;

use serde::Serialize;

/// The instance a launch ended up with.
///
/// `owned` is true when the current process serves the port and false when
/// the launch delegated to an instance that was already running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceInfo {
    pub port: u16,
    pub base_url: String,
    pub owned: bool,
}
