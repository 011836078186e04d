pub mod browser;
pub mod config;
pub mod coordinator;
pub mod registry;
pub mod roster;
pub mod server;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Browser(#[from] browser::BrowserError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Coordinator(#[from] coordinator::CoordinatorError),

    #[error(transparent)]
    Registry(#[from] registry::RegistryError),

    #[error(transparent)]
    Roster(#[from] roster::RosterError),

    #[error(transparent)]
    Server(#[from] server::ServerError),
}
