// liblabid/src/mifare/value.rs

//! MIFARE Classic value blocks.
//!
//! ```text
//! 0..4   value (LE i32)
//! 4..8   !value
//! 8..12  value
//! 12     addr   13 !addr   14 addr   15 !addr
//! ```

use crate::{Error, Result};

/// Decoded value block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueBlock {
    /// Signed 32 bit value.
    pub value: i32,
    /// Address byte, free for the application (usually a backup block).
    pub address: u8,
}

impl ValueBlock {
    pub fn new(value: i32, address: u8) -> Self {
        Self { value, address }
    }

    /// Block image with the redundant copies.
    pub fn to_bytes(&self) -> [u8; 16] {
        encode_value(self.value, self.address)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value = decode_value(bytes)?;
        Ok(Self {
            value,
            address: bytes[12],
        })
    }
}

/// Build the 16 byte value block for `value` stored at `address`.
pub fn encode_value(value: i32, address: u8) -> [u8; 16] {
    let v = value.to_le_bytes();
    let mut out = [0u8; 16];
    for i in 0..4 {
        out[i] = v[i];
        out[4 + i] = !v[i];
        out[8 + i] = v[i];
    }
    out[12] = address;
    out[13] = !address;
    out[14] = address;
    out[15] = !address;
    out
}

/// Value stored in a 16 byte value block. Every redundant copy must agree.
pub fn decode_value(bytes: &[u8]) -> Result<i32> {
    let b: &[u8; 16] = bytes.try_into().map_err(|_| Error::InvalidLength {
        expected: 16,
        actual: bytes.len(),
    })?;

    let value_ok = (0..4).all(|i| b[i] == b[8 + i] && b[i] == !b[4 + i]);
    let addr_ok = b[12] == b[14] && b[12] == !b[13] && b[12] == !b[15];
    if !value_ok || !addr_ok {
        return Err(Error::Format(format!(
            "not a value block: {}",
            crate::utils::bytes_to_hex(b)
        )));
    }
    Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
