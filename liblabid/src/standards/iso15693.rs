// liblabid/src/standards/iso15693.rs

use std::sync::Arc;

use crate::constants::CONTROL_ISO15693;
use crate::engine::ProtocolEngine;
use crate::protocol::{Command, parser};
use crate::standards::TagSource;
use crate::types::Uid;
use crate::{Error, Result};

/// ISO15693 UIDs are always 8 bytes.
pub const UID_LEN: usize = 8;

/// Request mode: addressed
pub const MODE_ADDRESSED: u8 = 0xA0;
/// Request mode: non addressed
pub const MODE_NON_ADDRESSED: u8 = 0x80;

const INVENTORY: u8 = 0x01;
const STAY_QUIET: u8 = 0x02;
const READ_SINGLE_BLOCK: u8 = 0x20;
const WRITE_SINGLE_BLOCK: u8 = 0x21;
const LOCK_BLOCK: u8 = 0x22;
const READ_MULTIPLE_BLOCKS: u8 = 0x23;
const GET_SYSTEM_INFORMATION: u8 = 0x2B;

/// Largest block any ISO15693 tag defines.
const MAX_BLOCK_SIZE: usize = 32;

pub(crate) fn check_uid(uid: &Uid) -> Result<()> {
    if uid.len() != UID_LEN {
        return Err(Error::Validation(format!(
            "iso15693 uid must be {} bytes, got {}",
            UID_LEN,
            uid.len()
        )));
    }
    Ok(())
}

/// Tag memory layout and identifiers reported by Get System Information.
///
/// The request framing used to fetch it (control 0xB0, addressed mode) is
/// inferred from the other ISO15693 requests, not from reader documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInformation {
    /// UID as reported (least significant byte first).
    pub uid: Uid,
    /// Data storage format identifier.
    pub dsfid: Option<u8>,
    /// Application family identifier.
    pub afi: Option<u8>,
    /// Number of blocks.
    pub block_count: Option<u16>,
    /// Bytes per block.
    pub block_size: Option<u8>,
    /// IC reference.
    pub ic_reference: Option<u8>,
}

impl SystemInformation {
    /// Layout: info flags, UID(8), then DSFID (0x01), AFI (0x02),
    /// memory size (0x04: blocks-1, size-1) and IC reference (0x08) as
    /// announced by the flags.
    pub fn decode(p: &[u8]) -> Result<Self> {
        let flags = parser::byte_at(p, 0)?;
        let uid = Uid::from_slice(parser::slice_at(p, 1, UID_LEN)?);
        let mut idx = 1 + UID_LEN;
        let mut next = |present: bool| -> Result<Option<u8>> {
            if !present {
                return Ok(None);
            }
            let b = parser::byte_at(p, idx)?;
            idx += 1;
            Ok(Some(b))
        };

        let dsfid = next(flags & 0x01 != 0)?;
        let afi = next(flags & 0x02 != 0)?;
        let has_memory = flags & 0x04 != 0;
        let blocks = next(has_memory)?;
        let size = next(has_memory)?;
        let ic_reference = next(flags & 0x08 != 0)?;

        Ok(Self {
            uid,
            dsfid,
            afi,
            block_count: blocks.map(|b| b as u16 + 1),
            block_size: size.map(|s| (s & 0x1F) + 1),
            ic_reference,
        })
    }
}

/// ISO15693 standard command set.
#[derive(Debug, Clone)]
pub struct Iso15693 {
    engine: Arc<ProtocolEngine>,
}

impl Iso15693 {
    /// ISO15693 commands over a shared engine.
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self { engine }
    }

    fn addressed(code: u8, uid: &Uid) -> Result<Command> {
        check_uid(uid)?;
        Ok(Command::new(CONTROL_ISO15693, MODE_ADDRESSED)
            .byte(code)
            .bytes(uid.as_bytes()))
    }

    /// UIDs of every tag in the field, as reported (least significant byte first).
    pub fn inventory(&self) -> Result<Vec<Uid>> {
        let cmd = Command::new(CONTROL_ISO15693, MODE_NON_ADDRESSED).byte(INVENTORY);
        let p = match self.engine.exchange_optional(&cmd)? {
            Some(p) => p,
            None => return Ok(Vec::new()),
        };
        let count = parser::byte_at(&p, 0)? as usize;
        (0..count)
            .map(|i| Ok(Uid::from_slice(parser::slice_at(&p, 1 + i * UID_LEN, UID_LEN)?)))
            .collect()
    }

    /// Silence the tag until the field is reset.
    pub fn stay_quiet(&self, uid: &Uid) -> Result<()> {
        self.engine.exchange(&Self::addressed(STAY_QUIET, uid)?)?;
        Ok(())
    }

    /// Contents of one block.
    pub fn read_single_block(&self, uid: &Uid, block: u8) -> Result<Vec<u8>> {
        self.engine
            .exchange(&Self::addressed(READ_SINGLE_BLOCK, uid)?.byte(block))
    }

    pub fn write_single_block(&self, uid: &Uid, block: u8, data: &[u8]) -> Result<()> {
        if data.is_empty() || data.len() > MAX_BLOCK_SIZE {
            return Err(Error::Validation(format!(
                "block data must be 1..={} bytes, got {}",
                MAX_BLOCK_SIZE,
                data.len()
            )));
        }
        self.engine.exchange(
            &Self::addressed(WRITE_SINGLE_BLOCK, uid)?
                .byte(block)
                .bytes(data),
        )?;
        Ok(())
    }

    /// Make a block permanently read only.
    pub fn lock_block(&self, uid: &Uid, block: u8) -> Result<()> {
        self.engine
            .exchange(&Self::addressed(LOCK_BLOCK, uid)?.byte(block))?;
        Ok(())
    }

    /// Read `n` (1..=256) consecutive blocks starting at `first`.
    pub fn read_multiple_blocks(&self, uid: &Uid, first: u8, n: u16) -> Result<Vec<u8>> {
        if !(1..=256).contains(&n) {
            return Err(Error::Validation(format!(
                "block count must be 1..=256, got {}",
                n
            )));
        }
        self.engine.exchange(
            &Self::addressed(READ_MULTIPLE_BLOCKS, uid)?
                .byte(first)
                .byte((n - 1) as u8),
        )
    }

    /// Memory layout and identifiers of the tag (command 0x2B).
    ///
    /// Sent as an addressed standard request: control 0xB0, mode 0xA0, the
    /// command code, then the 8 byte UID. This reader framing is not taken
    /// from vendor documentation; it follows the layout the other ISO15693
    /// requests use. The reply is decoded by [`SystemInformation::decode`].
    pub fn get_system_information(&self, uid: &Uid) -> Result<SystemInformation> {
        let p = self
            .engine
            .exchange(&Self::addressed(GET_SYSTEM_INFORMATION, uid)?)?;
        SystemInformation::decode(&p)
    }
}

impl TagSource for Iso15693 {
    fn snapshot(&self) -> Result<Vec<Uid>> {
        self.inventory()
    }
}
