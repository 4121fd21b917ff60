// liblabid/src/prelude.rs

pub use crate::engine::{EngineBuilder, EngineConfig, ProtocolEngine};
pub use crate::mifare::{AccessPermission, Mifare, SectorAuth, SectorTrailer, UlcOptions, ValueBlock};
pub use crate::protocol::{Command, Crc16, Trailer};
pub use crate::standards::{Icode, Iso14443a, Iso14443b, Iso15693, Picopass, TagSource};
pub use crate::transport::{MockTransport, TcpTransport, Transport};
pub use crate::{
    Atqa, Atqb, CardType, Error, Iso14443aTarget, KeyIndex, KeySource, KeyType, MifareKey,
    Result, SoftwareVersion, Uid,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, default_read_timeout, ms, parse_hex};
