// liblabid/src/protocol/trailer.rs

//! Integrity trailer strategies.
//!
//! The reader appends a trailer to every frame, computed over all preceding
//! bytes. Which algorithm a given firmware uses is a deployment detail, so the
//! engine takes any [`Trailer`]; [`Crc16`] covers the CRC-16 variants seen on
//! 13.56 MHz readers and [`Crc16::identify`] picks one from captured traffic.

use crate::{Error, Result};

/// A frame integrity trailer.
pub trait Trailer: Send + Sync + std::fmt::Debug {
    /// Number of trailer bytes at the end of a frame.
    fn len(&self) -> usize;

    /// Compute the trailer over `data`.
    fn compute(&self, data: &[u8]) -> Vec<u8>;

    /// Check `trailer` against the value computed over `data`.
    fn verify(&self, data: &[u8], trailer: &[u8]) -> Result<()> {
        let expected = self.compute(data);
        if expected != trailer {
            return Err(Error::ChecksumMismatch {
                expected,
                actual: trailer.to_vec(),
            });
        }
        Ok(())
    }
}

/// Reflected CRC-16 over polynomial 0x1021 (0x8408 reflected), sent LSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc16 {
    name: &'static str,
    init: u16,
    xorout: u16,
}

impl Crc16 {
    /// CRC-16/X-25 (ISO/IEC 13239, also ISO14443B CRC_B). Default.
    pub const X25: Self = Self::new("X-25", 0xFFFF, 0xFFFF);
    /// ISO14443A CRC_A.
    pub const ISO14443A: Self = Self::new("ISO14443A", 0x6363, 0x0000);
    /// CRC-16/MCRF4XX.
    pub const MCRF4XX: Self = Self::new("MCRF4XX", 0xFFFF, 0x0000);

    /// Presets tried by [`Crc16::identify`], most common first.
    pub const PRESETS: [Self; 3] = [Self::X25, Self::ISO14443A, Self::MCRF4XX];

    /// Reflected 0x8408 CRC with custom init and xorout.
    pub const fn new(name: &'static str, init: u16, xorout: u16) -> Self {
        Self { name, init, xorout }
    }

    /// Preset name, for logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// CRC over `data`.
    pub fn checksum(&self, data: &[u8]) -> u16 {
        let mut crc = self.init;
        for &b in data {
            crc ^= b as u16;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0x8408
                } else {
                    crc >> 1
                };
            }
        }
        crc ^ self.xorout
    }

    /// Return the first preset under which every captured frame validates.
    ///
    /// Each capture is a complete frame, trailer included.
    pub fn identify<'a, I>(captures: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [u8]>,
        I::IntoIter: Clone,
    {
        let captures = captures.into_iter();
        Self::PRESETS.into_iter().find(|preset| {
            let mut seen = false;
            let all_valid = captures.clone().all(|frame| {
                seen = true;
                frame.len() > 2 && {
                    let (data, trailer) = frame.split_at(frame.len() - 2);
                    preset.verify(data, trailer).is_ok()
                }
            });
            seen && all_valid
        })
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::X25
    }
}

impl Trailer for Crc16 {
    fn len(&self) -> usize {
        2
    }

    fn compute(&self, data: &[u8]) -> Vec<u8> {
        self.checksum(data).to_le_bytes().to_vec()
    }
}
