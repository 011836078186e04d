pub mod browser;
pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod roster;
pub mod server;

#[cfg(test)]
mod tests;

pub const ROLLCALL_SERVER_HOSTNAME: &str = "127.0.0.1";
pub const ROLLCALL_SERVER_BASE_URL: &str =
    const_format::concatcp!("http://", ROLLCALL_SERVER_HOSTNAME);

/// `http://127.0.0.1:<port>`, the only address instances are reached on.
pub fn base_url(port: u16) -> String {
    format!("{ROLLCALL_SERVER_BASE_URL}:{port}")
}
