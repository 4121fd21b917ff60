// liblabid/src/mifare/access.rs

//! MIFARE Classic access conditions.
//!
//! Each sector trailer stores three access bits (C1, C2, C3) for every data
//! block and for the trailer itself, once plain and once inverted:
//!
//! ```text
//! byte 6: !C2[3..0] !C1[3..0]
//! byte 7:  C1[3..0] !C3[3..0]
//! byte 8:  C3[3..0]  C2[3..0]
//! byte 9:  general purpose
//! ```
//!
//! Only eight bit patterns exist per block, so only the combinations listed
//! in the tables below can be encoded.

use crate::types::MifareKey;
use crate::{Error, Result};

/// Who may perform an operation on a data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockPermission {
    /// Either key.
    KeyAOrB,
    /// Key B only.
    KeyB,
    /// Nobody.
    Never,
}

/// Who may perform an operation on the sector trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrailerPermission {
    /// Either key.
    KeyAOrB,
    /// Key A only.
    KeyA,
    /// Key B only.
    KeyB,
    /// Nobody.
    Never,
}

/// Permissions of one data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockAccess {
    pub read: BlockPermission,
    pub write: BlockPermission,
    pub increment: BlockPermission,
    pub decrement: BlockPermission,
}

/// Permissions on the keys and access bits of the trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectorTrailerAccess {
    pub write_key_a: TrailerPermission,
    pub read_access: TrailerPermission,
    pub write_access: TrailerPermission,
    pub read_key_b: TrailerPermission,
    pub write_key_b: TrailerPermission,
}

/// Access conditions of one sector: three data blocks and the trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessPermission {
    /// Data blocks 0 to 2 of the sector.
    pub blocks: [BlockAccess; 3],
    /// Block 3.
    pub trailer: SectorTrailerAccess,
}

const fn block(
    read: BlockPermission,
    write: BlockPermission,
    increment: BlockPermission,
    decrement: BlockPermission,
) -> BlockAccess {
    BlockAccess {
        read,
        write,
        increment,
        decrement,
    }
}

const fn trailer(
    write_key_a: TrailerPermission,
    read_access: TrailerPermission,
    write_access: TrailerPermission,
    read_key_b: TrailerPermission,
    write_key_b: TrailerPermission,
) -> SectorTrailerAccess {
    SectorTrailerAccess {
        write_key_a,
        read_access,
        write_access,
        read_key_b,
        write_key_b,
    }
}

/// Data block conditions, indexed by C1 C2 C3.
pub const BLOCK_TABLE: [BlockAccess; 8] = {
    use BlockPermission::*;
    [
        block(KeyAOrB, KeyAOrB, KeyAOrB, KeyAOrB), // 000
        block(KeyAOrB, Never, Never, KeyAOrB),     // 001
        block(KeyAOrB, Never, Never, Never),       // 010
        block(KeyB, KeyB, Never, Never),           // 011
        block(KeyAOrB, KeyB, Never, Never),        // 100
        block(KeyB, Never, Never, Never),          // 101
        block(KeyAOrB, KeyB, KeyB, KeyAOrB),       // 110
        block(Never, Never, Never, Never),         // 111
    ]
};

/// Sector trailer conditions, indexed by C1 C2 C3.
pub const TRAILER_TABLE: [SectorTrailerAccess; 8] = {
    use TrailerPermission::*;
    [
        trailer(KeyA, KeyA, Never, KeyA, KeyA),      // 000
        trailer(KeyA, KeyA, KeyA, KeyA, KeyA),       // 001
        trailer(Never, KeyA, Never, KeyA, Never),    // 010
        trailer(KeyB, KeyAOrB, KeyB, Never, KeyB),   // 011
        trailer(KeyB, KeyAOrB, Never, Never, KeyB),  // 100
        trailer(Never, KeyAOrB, KeyB, Never, Never), // 101
        trailer(Never, KeyAOrB, Never, Never, Never), // 110
        trailer(Never, KeyAOrB, Never, Never, Never), // 111
    ]
};

impl AccessPermission {
    /// Factory configuration: data blocks open to both keys, trailer
    /// managed with key A (`FF 07 80`).
    pub const TRANSPORT: Self = Self {
        blocks: [BLOCK_TABLE[0]; 3],
        trailer: TRAILER_TABLE[1],
    };
}

impl Default for AccessPermission {
    fn default() -> Self {
        Self::TRANSPORT
    }
}

/// Split the three access bytes into their C1, C2, C3 nibbles, checking the
/// inverted copies.
fn nibbles(bits: &[u8]) -> Result<(u8, u8, u8)> {
    if bits.len() < 3 {
        return Err(Error::InvalidLength {
            expected: 3,
            actual: bits.len(),
        });
    }
    let (b6, b7, b8) = (bits[0], bits[1], bits[2]);
    let c1 = b7 >> 4;
    let c2 = b8 & 0x0F;
    let c3 = b8 >> 4;

    if b6 & 0x0F != !c1 & 0x0F || b6 >> 4 != !c2 & 0x0F || b7 & 0x0F != !c3 & 0x0F {
        return Err(Error::Format(format!(
            "access bits {:02x} {:02x} {:02x} fail the inverted copy check",
            b6, b7, b8
        )));
    }
    Ok((c1, c2, c3))
}

/// C1 C2 C3 of block `n` (3 = trailer) as a table index.
fn pattern(c: (u8, u8, u8), n: usize) -> usize {
    let bit = |nibble: u8| ((nibble >> n) & 1) as usize;
    (bit(c.0) << 2) | (bit(c.1) << 1) | bit(c.2)
}

/// Decode the access bytes (trailer bytes 6..9).
pub fn decode_access_bits(bits: &[u8]) -> Result<AccessPermission> {
    let c = nibbles(bits)?;
    Ok(AccessPermission {
        blocks: [
            BLOCK_TABLE[pattern(c, 0)],
            BLOCK_TABLE[pattern(c, 1)],
            BLOCK_TABLE[pattern(c, 2)],
        ],
        trailer: TRAILER_TABLE[pattern(c, 3)],
    })
}

/// Decode the access conditions of a 16 byte sector trailer.
pub fn decode(trailer: &[u8; 16]) -> Result<AccessPermission> {
    decode_access_bits(&trailer[6..9])
}

/// Encode access conditions into trailer bytes 6..10. The general purpose
/// byte is left 0.
pub fn encode(p: &AccessPermission) -> Result<[u8; 4]> {
    let mut patterns = [0usize; 4];
    for (n, b) in p.blocks.iter().enumerate() {
        patterns[n] = BLOCK_TABLE
            .iter()
            .position(|t| t == b)
            .ok_or_else(|| Error::Format(format!("block {} access {:?} has no encoding", n, b)))?;
    }
    patterns[3] = TRAILER_TABLE
        .iter()
        .position(|t| *t == p.trailer)
        .ok_or_else(|| Error::Format(format!("trailer access {:?} has no encoding", p.trailer)))?;

    let (mut c1, mut c2, mut c3) = (0u8, 0u8, 0u8);
    for (n, &pat) in patterns.iter().enumerate() {
        c1 |= (((pat >> 2) & 1) as u8) << n;
        c2 |= (((pat >> 1) & 1) as u8) << n;
        c3 |= ((pat & 1) as u8) << n;
    }

    Ok([
        ((!c2 & 0x0F) << 4) | (!c1 & 0x0F),
        (c1 << 4) | (!c3 & 0x0F),
        (c3 << 4) | c2,
        0x00,
    ])
}

/// A complete sector trailer block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorTrailer {
    pub key_a: MifareKey,
    pub access: AccessPermission,
    pub general_purpose: u8,
    pub key_b: MifareKey,
}

impl SectorTrailer {
    pub fn new(key_a: MifareKey, access: AccessPermission, key_b: MifareKey) -> Self {
        Self {
            key_a,
            access,
            general_purpose: 0,
            key_b,
        }
    }

    pub fn to_bytes(&self) -> Result<[u8; 16]> {
        let bits = encode(&self.access)?;
        let mut out = [0u8; 16];
        out[..6].copy_from_slice(self.key_a.as_bytes());
        out[6..9].copy_from_slice(&bits[..3]);
        out[9] = self.general_purpose;
        out[10..].copy_from_slice(self.key_b.as_bytes());
        Ok(out)
    }

    /// Parse a trailer. Key A reads back as zeroes from a real tag.
    pub fn from_bytes(bytes: &[u8; 16]) -> Result<Self> {
        let access = decode(bytes)?;
        let mut key_a = [0u8; 6];
        let mut key_b = [0u8; 6];
        key_a.copy_from_slice(&bytes[..6]);
        key_b.copy_from_slice(&bytes[10..]);
        Ok(Self {
            key_a: MifareKey::from_bytes(key_a),
            access,
            general_purpose: bytes[9],
            key_b: MifareKey::from_bytes(key_b),
        })
    }
}
