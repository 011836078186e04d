// Library exports for testing
// The binary (main.rs) imports these as well

pub mod environment;
pub mod error;
pub mod logger;

#[cfg(test)]
mod tests;
