// liblabid/src/mifare/commands.rs

//! MIFARE macro commands (control byte 0x04).
//!
//! A macro activates the tag, authenticates and moves data in one round
//! trip. Write macros reply with the UID of the tag written.

use std::sync::Arc;

use log::debug;

use crate::constants::CONTROL_MIFARE_MACRO;
use crate::engine::ProtocolEngine;
use crate::mifare::auth::UltralightCAuth;
use crate::protocol::{Command, parser};
use crate::standards::Iso14443a;
use crate::types::{KeyIndex, KeySource, KeyType, MifareKey, Uid};
use crate::{Error, Result};

const WRITE_ULTRALIGHT_MASKED: u8 = 0x21;
const READ_ULTRALIGHT: u8 = 0x22;
const WRITE_ULTRALIGHT_C: u8 = 0x23;
const READ_ULTRALIGHT_C: u8 = 0x24;
const WRITE_SECTOR: u8 = 0x41;
const READ_SECTOR: u8 = 0x42;
const INIT_SECTOR_TRAILERS: u8 = 0x43;

/// Retry bound for the sector macros, which span several tag operations.
pub const MACRO_RETRIES: u32 = 5;

/// Ultralight memory size (16 pages of 4 bytes)
pub const UL_SIZE: usize = 64;
/// Ultralight page size
pub const UL_BLOCK_SIZE: usize = 4;
/// MIFARE Classic block size
pub const CLASSIC_BLOCK_SIZE: usize = 16;

/// Ultralight C memory size in pages
pub const ULC_PAGES: usize = 48;

/// First user page of Ultralight and Ultralight C
const UL_USER_BLOCK: u8 = 4;
const UL_USER_MAX: usize = 48;
const ULC_USER_MAX: usize = 144;
const ULC_USER_BLOCKS: u8 = 36;

const FLAG_EEPROM_KEY: u8 = 0x10;
const FLAG_KEY_B: u8 = 0x40;
const FLAG_ACCESS_KEY: u8 = 0x80;

/// Options byte of the Ultralight C macros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UlcOptions {
    /// Assume the tag is already active.
    pub skip_activation: bool,
    /// Cycle the RF field before the command.
    pub rf_reset: bool,
}

impl UlcOptions {
    /// Wire encoding: bit0 skip activation, bit1 RF reset.
    pub fn byte(self) -> u8 {
        (self.skip_activation as u8) | ((self.rf_reset as u8) << 1)
    }
}

/// Key used by the sector macros. `key = None` clears the access key flag
/// and the reader authenticates with the default key (six 0xFF bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorAuth {
    /// Key A or key B.
    pub key_type: KeyType,
    /// `None` for the reader default key.
    pub key: Option<KeySource>,
}

impl SectorAuth {
    /// Authenticate with the reader's default key.
    pub fn default_key(key_type: KeyType) -> Self {
        Self {
            key_type,
            key: None,
        }
    }

    /// Authenticate with an explicit key sent in the command.
    pub fn with_key(key_type: KeyType, key: MifareKey) -> Self {
        Self {
            key_type,
            key: Some(KeySource::Explicit(key)),
        }
    }

    /// Authenticate with a key stored in the reader's EEPROM.
    pub fn with_eeprom_key(key_type: KeyType, index: KeyIndex) -> Self {
        Self {
            key_type,
            key: Some(KeySource::Eeprom(index)),
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.key_type == KeyType::B {
            flags |= FLAG_KEY_B;
        }
        match self.key {
            Some(KeySource::Explicit(_)) => flags |= FLAG_ACCESS_KEY,
            Some(KeySource::Eeprom(_)) => flags |= FLAG_ACCESS_KEY | FLAG_EEPROM_KEY,
            None => {}
        }
        flags
    }

    fn append_to(&self, cmd: Command) -> Command {
        match self.key {
            Some(KeySource::Explicit(key)) => cmd.bytes(key.as_bytes()),
            Some(KeySource::Eeprom(index)) => cmd.byte(index.get()),
            None => cmd,
        }
    }
}

/// MIFARE Ultralight, Ultralight C and Classic macro commands.
#[derive(Debug, Clone)]
pub struct Mifare {
    engine: Arc<ProtocolEngine>,
    iso: Iso14443a,
}

impl Mifare {
    /// Macro commands over a shared engine.
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        let iso = Iso14443a::new(engine.clone());
        Self { engine, iso }
    }

    fn cmd(code: u8) -> Command {
        Command::new(CONTROL_MIFARE_MACRO, code)
    }

    fn written_uid(p: &[u8]) -> Result<Uid> {
        Ok(Uid::from_slice(parser::len_prefixed_at(p, 0)?))
    }

    fn check_ulc_range(first: u8, n: u8) -> Result<()> {
        if n == 0 || first as usize + n as usize > ULC_PAGES {
            return Err(Error::Validation(format!(
                "ultralight c pages {}..{} outside 1..={} pages",
                first,
                first as usize + n as usize,
                ULC_PAGES
            )));
        }
        Ok(())
    }

    fn check_not_empty(data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::Validation("no data to write".into()));
        }
        Ok(())
    }

    /// `len` bytes of Ultralight memory from byte `offset`.
    pub fn read_ultralight(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        if offset + len > UL_SIZE {
            return Err(Error::Validation(format!(
                "ultralight range {}..{} exceeds {} bytes",
                offset,
                offset + len,
                UL_SIZE
            )));
        }
        let p = self.engine.exchange(&Self::cmd(READ_ULTRALIGHT))?;
        Ok(parser::slice_at(&p, offset, len)?.to_vec())
    }

    /// The whole 64 byte Ultralight memory.
    pub fn read_ultralight_all(&self) -> Result<Vec<u8>> {
        self.read_ultralight(0, UL_SIZE)
    }

    /// Ultralight user memory (pages 4 to 15).
    pub fn read_ultralight_user_data(&self) -> Result<Vec<u8>> {
        self.read_ultralight(UL_USER_BLOCK as usize * UL_BLOCK_SIZE, UL_USER_MAX)
    }

    /// `n` pages of Ultralight C memory from page `first`.
    pub fn read_ultralight_c(&self, first: u8, n: u8, options: UlcOptions) -> Result<Vec<u8>> {
        Self::check_ulc_range(first, n)?;
        let p = self.engine.exchange(
            &Self::cmd(READ_ULTRALIGHT_C)
                .byte(options.byte())
                .byte(first)
                .byte(n),
        )?;
        Ok(parser::slice_at(&p, 0, n as usize * UL_BLOCK_SIZE)?.to_vec())
    }

    /// Ultralight C user memory (pages 4 to 39).
    pub fn read_ultralight_c_user_data(&self) -> Result<Vec<u8>> {
        self.read_ultralight_c(
            UL_USER_BLOCK,
            ULC_USER_BLOCKS,
            UlcOptions {
                skip_activation: false,
                rf_reset: true,
            },
        )
    }

    /// Write the Ultralight pages selected by `mask` (bit n = page n).
    pub fn write_ultralight_masked(&self, data: &[u8], mask: u16) -> Result<Uid> {
        if mask == 0 {
            return Err(Error::Validation("page mask selects no pages".into()));
        }
        let expected = mask.count_ones() as usize * UL_BLOCK_SIZE;
        if data.len() != expected {
            return Err(Error::Validation(format!(
                "mask {:#06x} selects {} bytes, got {}",
                mask,
                expected,
                data.len()
            )));
        }
        let p = self.engine.exchange(
            &Self::cmd(WRITE_ULTRALIGHT_MASKED)
                .le_u16(mask)
                .bytes(data),
        )?;
        Self::written_uid(&p)
    }

    /// Write up to 48 bytes of user data from page 4, zero padded to whole
    /// pages.
    pub fn write_ultralight_user_data(&self, data: &[u8]) -> Result<Uid> {
        Self::check_not_empty(data)?;
        if data.len() > UL_USER_MAX {
            return Err(Error::Validation(format!(
                "ultralight user data is at most {} bytes, got {}",
                UL_USER_MAX,
                data.len()
            )));
        }
        let padded = pad_to_blocks(data);
        let blocks = (padded.len() / UL_BLOCK_SIZE) as u32;
        let mask = (((1u32 << blocks) - 1) << UL_USER_BLOCK) as u16;
        self.write_ultralight_masked(&padded, mask)
    }

    /// Write `n` pages of Ultralight C memory from page `first`.
    pub fn write_ultralight_c(
        &self,
        data: &[u8],
        first: u8,
        n: u8,
        options: UlcOptions,
    ) -> Result<Uid> {
        Self::check_ulc_range(first, n)?;
        let expected = n as usize * UL_BLOCK_SIZE;
        if data.len() != expected {
            return Err(Error::Validation(format!(
                "{} pages need {} bytes, got {}",
                n,
                expected,
                data.len()
            )));
        }
        let p = self.engine.exchange(
            &Self::cmd(WRITE_ULTRALIGHT_C)
                .byte(options.byte())
                .byte(first)
                .byte(n)
                .bytes(data),
        )?;
        Self::written_uid(&p)
    }

    /// Write up to 144 bytes of user data from page 4, zero padded.
    pub fn write_ultralight_c_user_data(&self, data: &[u8]) -> Result<Uid> {
        Self::check_not_empty(data)?;
        if data.len() > ULC_USER_MAX {
            return Err(Error::Validation(format!(
                "ultralight c user data is at most {} bytes, got {}",
                ULC_USER_MAX,
                data.len()
            )));
        }
        let padded = pad_to_blocks(data);
        let n = (padded.len() / UL_BLOCK_SIZE) as u8;
        self.write_ultralight_c(
            &padded,
            UL_USER_BLOCK,
            n,
            UlcOptions {
                skip_activation: false,
                rf_reset: true,
            },
        )
    }

    fn sector_cmd(code: u8, sector: u8, auth: &SectorAuth, mask: u16) -> Command {
        let cmd = Self::cmd(code)
            .byte(sector)
            .byte(auth.flags())
            .le_u16(mask);
        auth.append_to(cmd)
    }

    /// Read the blocks of `sector` selected by `mask` (bit n = block n of
    /// the sector).
    pub fn read_sector(&self, sector: u8, auth: &SectorAuth, mask: u16) -> Result<Vec<u8>> {
        debug!(
            "read sector {} mask {:#06x} with key {}",
            sector, mask, auth.key_type
        );
        let p = self
            .engine
            .exchange_with_retries(&Self::sector_cmd(READ_SECTOR, sector, auth, mask), MACRO_RETRIES)?;
        Ok(parser::len_prefixed_at(&p, 0)?.to_vec())
    }

    /// Write the blocks of `sector` selected by `mask`; `data` holds 16
    /// bytes per selected block.
    pub fn write_sector(&self, data: &[u8], sector: u8, auth: &SectorAuth, mask: u16) -> Result<Uid> {
        let expected = mask.count_ones() as usize * CLASSIC_BLOCK_SIZE;
        if data.len() != expected {
            return Err(Error::Validation(format!(
                "mask {:#06x} selects {} bytes, got {}",
                mask,
                expected,
                data.len()
            )));
        }
        debug!(
            "write sector {} mask {:#06x} with key {}",
            sector, mask, auth.key_type
        );
        let cmd = Self::sector_cmd(WRITE_SECTOR, sector, auth, mask).bytes(data);
        let p = self.engine.exchange_with_retries(&cmd, MACRO_RETRIES)?;
        Self::written_uid(&p)
    }

    /// Write one sector trailer per bit set in `mask` (bit n = sector n,
    /// up to 40 sectors).
    pub fn initialize_sector_trailers(&self, mask: u64, trailers: &[[u8; 16]]) -> Result<Uid> {
        if mask >> 40 != 0 {
            return Err(Error::Validation(format!(
                "sector mask {:#x} exceeds 40 sectors",
                mask
            )));
        }
        if mask.count_ones() as usize != trailers.len() {
            return Err(Error::Validation(format!(
                "mask selects {} sectors, got {} trailers",
                mask.count_ones(),
                trailers.len()
            )));
        }
        let mut cmd = Self::cmd(INIT_SECTOR_TRAILERS).bytes(&mask.to_le_bytes()[..5]);
        for t in trailers {
            cmd = cmd.bytes(t);
        }
        let p = self.engine.exchange_with_retries(&cmd, MACRO_RETRIES)?;
        Self::written_uid(&p)
    }

    /// Ultralight C 3DES authentication with a 16 byte key. `Ok(false)` when
    /// the tag rejects the key.
    pub fn authenticate_ultralight_c(&self, key: &[u8]) -> Result<bool> {
        let mut auth = UltralightCAuth::new(&self.iso, key)?;
        auth.run(&mut rand::thread_rng())
    }
}

fn pad_to_blocks(data: &[u8]) -> Vec<u8> {
    let mut padded = data.to_vec();
    padded.resize(data.len().div_ceil(UL_BLOCK_SIZE) * UL_BLOCK_SIZE, 0x00);
    padded
}
