// liblabid/src/protocol/mod.rs

/// Command builder
pub mod command;
/// Frame encoding and validation
pub mod frame;
/// Bounds-checked payload readers
pub mod parser;
/// Frame trailers (CRC presets)
pub mod trailer;

pub use command::Command;
pub use frame::{Frame, Reply};
pub use trailer::{Crc16, Trailer};
