mod config;
mod coordinator;
mod discovery;
mod error;
mod helpers;
mod registry;
mod roster;
mod server;
