//! Instance discovery and port allocation.
//!
//! Three layers, cheapest first:
//! - [`probe`]: is anything accepting TCP connections on a loopback port
//! - [`handshake`]: is that something this application (`GET /ping`)
//! - [`allocator`]: ascending scan of the candidate range built on the two above
//!
//! None of these return errors. Every failure (refused, timeout, garbage
//! response) folds into "not reachable" or "not ours", which is all the
//! coordinator needs to decide between delegating and binding.

pub mod allocator;
pub mod handshake;
pub mod probe;
