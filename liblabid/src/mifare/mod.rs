// liblabid/src/mifare/mod.rs

//! MIFARE support on top of the ISO14443A command set: the reader's macro
//! commands, the sector trailer access codec, value blocks and Ultralight C
//! authentication.

/// Sector trailer access bits
pub mod access;
/// Ultralight C mutual authentication
pub mod auth;
/// Reader macro commands
pub mod commands;
/// Value blocks
pub mod value;

pub use access::{
    AccessPermission, BlockAccess, BlockPermission, SectorTrailer, SectorTrailerAccess,
    TrailerPermission,
};
pub use auth::{AuthState, RawExchange, UltralightCAuth};
pub use commands::{Mifare, SectorAuth, UlcOptions};
pub use value::{ValueBlock, decode_value, encode_value};
