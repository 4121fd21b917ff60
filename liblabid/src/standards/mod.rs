// liblabid/src/standards/mod.rs

//! Per-standard command sets. Each holds a shared [`ProtocolEngine`] and
//! exposes only its own standard's operations, so several of them can run
//! over one reader connection.
//!
//! [`ProtocolEngine`]: crate::engine::ProtocolEngine

/// NXP ICODE custom commands
pub mod icode;
/// ISO14443A and MIFARE Classic primitives
pub mod iso14443a;
/// ISO14443B and ST SR176/SRIX
pub mod iso14443b;
/// ISO15693 standard commands
pub mod iso15693;
/// Picopass
pub mod picopass;

pub use icode::{Icode, PageProtection, PasswordId};
pub use iso14443a::Iso14443a;
pub use iso14443b::Iso14443b;
pub use iso15693::{Iso15693, SystemInformation};
pub use picopass::Picopass;

use crate::Result;
use crate::types::Uid;

/// Snapshot of the tags currently in the field, for polling loops.
///
/// Cadence, de-duplication and publishing of changes belong to the caller.
pub trait TagSource {
    fn snapshot(&self) -> Result<Vec<Uid>>;
}
