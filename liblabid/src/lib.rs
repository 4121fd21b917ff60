// liblabid/src/lib.rs

//! liblabid
//!
//! Pure Rust driver for LAB ID multi-standard RFID readers: the framed
//! command protocol, the ISO14443A/B, ISO15693, ICODE and Picopass command
//! sets, and the MIFARE macro commands with their access and value codecs.
#![warn(missing_docs)]

/// Wire constants
pub mod constants;
/// Request/response engine shared by every command set
pub mod engine;
/// Error type and `Result` alias
pub mod error;
/// MIFARE macros, access bits, value blocks and Ultralight C authentication
pub mod mifare;
/// Common imports
pub mod prelude;
/// Frames, commands and trailers
pub mod protocol;
/// Per-standard command sets
pub mod standards;
/// Mock engines for tests
pub mod test_support;
/// Byte links to the reader
pub mod transport;
/// Identifiers, keys and tag descriptors
pub mod types;
/// Hex and timeout helpers
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the identifier types are available without the module path.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
