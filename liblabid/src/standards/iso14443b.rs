// liblabid/src/standards/iso14443b.rs

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::constants::{CONTROL_ISO14443B, CONTROL_ISO14443B_ST};
use crate::engine::ProtocolEngine;
use crate::protocol::{Command, parser};
use crate::types::{Atqb, Uid};
use crate::{Error, Result};

const REQ_B: u8 = 0x05;

/// Family byte for ST SR176/SRIX tags
const FAMILY_ST: u8 = 0x02;

const ST_SELECT: u8 = 0x0E;
const ST_GET_UID: u8 = 0x0B;
const ST_READ: u8 = 0x88;
const ST_WRITE: u8 = 0x89;
const ST_COMPLETION: u8 = 0x0F;
const ST_GET_PROTECTION: u8 = 0x18;
const ST_PROTECT: u8 = 0x19;

const SR176_BLOCK_SIZE: u8 = 2;
const SRIX_BLOCK_SIZE: u8 = 4;

#[derive(Debug, Default)]
struct StState {
    chip_id: Option<u8>,
    srix: bool,
}

/// ISO14443B command set: REQB plus the ST SR176/SRIX custom family.
///
/// Remembers the chip id of the last selected tag and whether the last
/// successful write used SRIX (4 byte) blocks.
#[derive(Debug)]
pub struct Iso14443b {
    engine: Arc<ProtocolEngine>,
    state: Mutex<StState>,
}

impl Iso14443b {
    /// ISO14443B commands over a shared engine.
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self {
            engine,
            state: Mutex::new(StState::default()),
        }
    }

    fn st(code: u8) -> Command {
        Command::new(CONTROL_ISO14443B_ST, FAMILY_ST).byte(code)
    }

    /// REQB for tags of application family `afi` (0 = all).
    pub fn req_b(&self, afi: u8) -> Result<Option<Atqb>> {
        self.engine
            .exchange_optional(&Command::new(CONTROL_ISO14443B, REQ_B).byte(afi))?
            .map(|p| Atqb::try_from(p.as_slice()))
            .transpose()
    }

    /// Select an ST tag. Returns its chip id, `None` when no tag answers.
    pub fn select(&self) -> Result<Option<u8>> {
        let chip_id = match self.engine.exchange_optional(&Self::st(ST_SELECT))? {
            Some(p) => parser::byte_at(&p, 0)?,
            None => return Ok(None),
        };
        self.state.lock().chip_id = Some(chip_id);
        Ok(Some(chip_id))
    }

    /// Chip id of the last selected tag.
    pub fn chip_id(&self) -> Option<u8> {
        self.state.lock().chip_id
    }

    /// Whether the last successful write used SRIX block size.
    pub fn last_was_srix(&self) -> bool {
        self.state.lock().srix
    }

    /// Read `n` blocks from `first`; the reader reports the block size.
    pub fn read(&self, first: u8, n: u8) -> Result<Vec<u8>> {
        let p = self
            .engine
            .exchange(&Self::st(ST_READ).byte(first).byte(n))?;
        let block_size = parser::byte_at(&p, 0)? as usize;
        Ok(parser::slice_at(&p, 1, block_size * n as usize)?.to_vec())
    }

    /// SRIX4K UID. `None` for tags without the command (SR176).
    pub fn get_uid(&self) -> Result<Option<Uid>> {
        match self.engine.exchange_optional(&Self::st(ST_GET_UID))? {
            Some(p) => Ok(Some(Uid::from_slice(parser::len_prefixed_at(&p, 0)?))),
            None => Ok(None),
        }
    }

    /// UID of an SRIX4K, or the first four blocks of an SR176.
    pub fn read_uid(&self) -> Result<Option<Uid>> {
        if let Some(uid) = self.get_uid()? {
            return Ok(Some(uid));
        }
        match self.read(0, 4) {
            Ok(bytes) => Ok(Some(Uid::from(bytes))),
            Err(Error::Protocol { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write `n` blocks from `first`. `data` is zero padded or truncated to
    /// the block size. The block size (SR176: 2, SRIX: 4) of the last write
    /// is tried first; on a reader error the other one is tried and kept.
    pub fn write(&self, first: u8, n: u8, data: &[u8]) -> Result<()> {
        let srix = self.state.lock().srix;
        let (preferred, other) = if srix {
            (SRIX_BLOCK_SIZE, SR176_BLOCK_SIZE)
        } else {
            (SR176_BLOCK_SIZE, SRIX_BLOCK_SIZE)
        };

        match self.write_blocks(first, n, data, preferred) {
            Err(Error::Protocol { code }) => {
                debug!(
                    "st write with {} byte blocks failed ({:#04x}), trying {}",
                    preferred, code, other
                );
                self.write_blocks(first, n, data, other)?;
                self.state.lock().srix = other == SRIX_BLOCK_SIZE;
                Ok(())
            }
            result => result,
        }
    }

    fn write_blocks(&self, first: u8, n: u8, data: &[u8], block_size: u8) -> Result<()> {
        let len = n as usize * block_size as usize;
        let mut padded = data.to_vec();
        padded.resize(len, 0x00);
        self.engine.exchange(
            &Self::st(ST_WRITE)
                .byte(first)
                .byte(n)
                .byte(block_size)
                .bytes(&padded),
        )?;
        Ok(())
    }

    /// Send the tag to the deactivated state.
    pub fn completion(&self) -> Result<()> {
        self.engine.exchange(&Self::st(ST_COMPLETION))?;
        Ok(())
    }

    /// Write the lock register of the selected tag.
    pub fn protect(&self, lock_reg: u8) -> Result<()> {
        let chip_id = self
            .chip_id()
            .ok_or_else(|| Error::Validation("no st tag selected".into()))?;
        self.engine
            .exchange(&Self::st(ST_PROTECT).byte(chip_id).byte(lock_reg))?;
        Ok(())
    }

    /// Read the lock register.
    pub fn protection(&self) -> Result<u8> {
        let p = self.engine.exchange(&Self::st(ST_GET_PROTECTION))?;
        parser::byte_at(&p, 1)
    }
}
