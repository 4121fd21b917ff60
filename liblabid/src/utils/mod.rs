//! Small helpers shared across liblabid: hex rendering for frame logs and
//! the timeout defaults used by the engine configuration.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
