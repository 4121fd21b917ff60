// liblabid/src/types.rs

use crate::{Error, Result};
use derive_more::{Display, From};
use std::convert::TryFrom;

/// Tag identifier - Newtype Pattern (可変長)
///
/// Bytes are kept in the order the reader reports them. ISO15693 readers
/// report the UID least significant byte first; use [`Uid::reversed`] to
/// print it the way it is written on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid(Vec<u8>);

impl Uid {
    /// Copy a UID out of a reply.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The same UID with its byte order flipped.
    pub fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }

    /// Compact lowercase hex.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(&self.0)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Uid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::utils::bytes_to_hex_sep(&self.0, ':'))
    }
}

/// ISO14443A answer to request (2 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atqa([u8; 2]);

impl Atqa {
    /// ATQA as received.
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }

    /// UID length announced by the size-class bits (b8..b7 of the first byte).
    pub fn uid_len(&self) -> Result<usize> {
        match self.0[0] >> 6 {
            0b00 => Ok(4),
            0b01 => Ok(7),
            0b10 => Ok(10),
            _ => Err(Error::Format(format!(
                "atqa {:02x}{:02x} declares a reserved uid size",
                self.0[0], self.0[1]
            ))),
        }
    }
}

impl TryFrom<&[u8]> for Atqa {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 2] = bytes.try_into().map_err(|_| Error::InvalidLength {
            expected: 2,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

/// ISO14443A tag family as announced by SAK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CardType {
    #[display(fmt = "MIFARE Ultralight")]
    Ultralight,
    #[display(fmt = "MIFARE Classic 1K")]
    Classic1k,
    #[display(fmt = "MIFARE Mini")]
    Mini,
    #[display(fmt = "MIFARE Classic 4K")]
    Classic4k,
    #[display(fmt = "MIFARE DESFire")]
    Desfire,
    #[display(fmt = "unknown")]
    Unknown,
}

impl CardType {
    /// Classify by exact SAK value.
    pub fn from_sak(sak: u8) -> Self {
        match sak {
            0x00 => Self::Ultralight,
            0x08 => Self::Classic1k,
            0x09 => Self::Mini,
            0x18 => Self::Classic4k,
            0x20 => Self::Desfire,
            _ => Self::Unknown,
        }
    }
}

/// Result of an ISO14443A activation: UID, ATQA and SAK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iso14443aTarget {
    /// UID of the activated tag.
    pub uid: Uid,
    pub atqa: Atqa,
    /// Select acknowledge.
    pub sak: u8,
}

impl Iso14443aTarget {
    /// Tag family from the SAK.
    pub fn card_type(&self) -> CardType {
        CardType::from_sak(self.sak)
    }
}

/// ISO14443B answer to REQB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atqb {
    /// Pseudo unique PICC identifier.
    pub pupi: [u8; 4],
    /// Application data.
    pub application_data: [u8; 4],
    /// Protocol info.
    pub protocol_info: [u8; 3],
}

impl TryFrom<&[u8]> for Atqb {
    type Error = Error;

    /// Layout: 0x50 + PUPI(4) + application data(4) + protocol info(3)
    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 {
            return Err(Error::InvalidLength {
                expected: 12,
                actual: bytes.len(),
            });
        }
        if bytes[0] != 0x50 {
            return Err(Error::Format(format!(
                "atqb must start with 0x50, got {:#04x}",
                bytes[0]
            )));
        }
        let mut atqb = Self {
            pupi: [0; 4],
            application_data: [0; 4],
            protocol_info: [0; 3],
        };
        atqb.pupi.copy_from_slice(&bytes[1..5]);
        atqb.application_data.copy_from_slice(&bytes[5..9]);
        atqb.protocol_info.copy_from_slice(&bytes[9..12]);
        Ok(atqb)
    }
}

/// MIFARE Classic sector key (6 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MifareKey([u8; 6]);

impl MifareKey {
    /// Factory default transport key.
    pub const DEFAULT: Self = Self([0xFF; 6]);

    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl Default for MifareKey {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<&[u8]> for MifareKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 6] = bytes
            .try_into()
            .map_err(|_| Error::Validation(format!("key must be 6 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }
}

/// Slot of a key stored in the reader's EEPROM (0..=31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyIndex(u8);

impl KeyIndex {
    /// Highest EEPROM slot.
    pub const MAX: u8 = 31;

    /// `Validation` error above [`KeyIndex::MAX`].
    pub fn new(index: u8) -> Result<Self> {
        if index > Self::MAX {
            return Err(Error::Validation(format!(
                "eeprom key index {} out of range 0..={}",
                index,
                Self::MAX
            )));
        }
        Ok(Self(index))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
/// MIFARE Classic key slot of a sector.
pub enum KeyType {
    #[display(fmt = "key A")]
    A,
    #[display(fmt = "key B")]
    B,
}

/// Where the reader takes a MIFARE key from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
pub enum KeySource {
    /// Key sent with the command.
    Explicit(MifareKey),
    /// Key stored in the reader's EEPROM.
    Eeprom(KeyIndex),
}

/// Reader firmware version, as returned by the liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftwareVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Build date, two digit year.
    pub year: u8,
    pub month: u8,
    pub day: u8,
}

impl TryFrom<&[u8]> for SoftwareVersion {
    type Error = Error;

    /// Layout: major, minor, year, month, day
    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 5 {
            return Err(Error::InvalidLength {
                expected: 5,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            major: bytes[0],
            minor: bytes[1],
            year: bytes[2],
            month: bytes[3],
            day: bytes[4],
        })
    }
}

impl std::fmt::Display for SoftwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} ({:02}-{:02}-{:02})",
            self.major, self.minor, self.day, self.month, self.year
        )
    }
}
