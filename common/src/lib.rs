//! Shared building blocks for the RollCall workspace.
//!
//! Everything here is dependency-light so that `models`, `instance-core` and
//! the launcher binary can all agree on the same error-location type.

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
