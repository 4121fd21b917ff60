// liblabid/src/standards/iso14443a.rs

use std::sync::Arc;

use log::debug;

use crate::constants::CONTROL_ISO14443A;
use crate::engine::ProtocolEngine;
use crate::mifare::auth::RawExchange;
use crate::protocol::{Command, parser};
use crate::standards::TagSource;
use crate::types::{Atqa, Iso14443aTarget, KeyIndex, KeySource, KeyType, MifareKey, Uid};
use crate::{Error, Result};

const ACTIVATE_IDLE: u8 = 0x90;
const ACTIVATE_WAKEUP: u8 = 0x91;
const LOAD_KEY: u8 = 0x19;
const LOAD_KEY_EEPROM: u8 = 0x0B;
const STORE_KEY_EEPROM: u8 = 0x0C;
const AUTH_A: u8 = 0x60;
const AUTH_B: u8 = 0x61;
const READ16: u8 = 0x30;
const WRITE16: u8 = 0xA0;
const WRITE4: u8 = 0xA2;
const DECREMENT: u8 = 0xC0;
const INCREMENT: u8 = 0xC1;
const TRANSFER: u8 = 0xB0;
const HALT: u8 = 0x50;
const SHOW_CARDS: u8 = 0xD0;
const REQ_A: u8 = 0x26;
const WUPA: u8 = 0x52;
const CASCADE_1: u8 = 0x93;
const RATS: u8 = 0xE0;
const EXCHANGE_3: u8 = 0xD1;
const EXCHANGE_4: u8 = 0xD2;

/// ISO14443A command set (control byte 0xA0), including the MIFARE Classic
/// primitives the reader exposes at this level.
#[derive(Debug, Clone)]
pub struct Iso14443a {
    engine: Arc<ProtocolEngine>,
}

impl Iso14443a {
    /// ISO14443A commands over a shared engine.
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self { engine }
    }

    /// The engine these commands go through.
    pub fn engine(&self) -> &Arc<ProtocolEngine> {
        &self.engine
    }

    fn cmd(code: u8) -> Command {
        Command::new(CONTROL_ISO14443A, code)
    }

    /// Activate a tag in the idle state. `None` when no tag answers.
    pub fn activate_idle(&self) -> Result<Option<Iso14443aTarget>> {
        self.engine
            .exchange_optional(&Self::cmd(ACTIVATE_IDLE))?
            .map(|p| decode_activation(&p))
            .transpose()
    }

    /// Wake up and activate the halted tag with the given UID.
    pub fn activate_wakeup(&self, uid: &Uid) -> Result<Option<Iso14443aTarget>> {
        self.engine
            .exchange_optional(&Self::cmd(ACTIVATE_WAKEUP).bytes(uid.as_bytes()))?
            .map(|p| decode_activation(&p))
            .transpose()
    }

    /// UIDs of every tag in the field.
    pub fn show_cards(&self) -> Result<Vec<Uid>> {
        match self.engine.exchange_optional(&Self::cmd(SHOW_CARDS))? {
            Some(p) => decode_card_list(&p),
            None => Ok(Vec::new()),
        }
    }

    /// Read one 16 byte block.
    pub fn read16(&self, block: u8) -> Result<[u8; 16]> {
        let p = self.engine.exchange(&Self::cmd(READ16).byte(block))?;
        parser::array_at::<16>(&p, 0)
    }

    /// Write one 16 byte block.
    pub fn write16(&self, data: &[u8], block: u8) -> Result<()> {
        expect_size(data, 16)?;
        self.engine
            .exchange(&Self::cmd(WRITE16).byte(block).bytes(data))?;
        Ok(())
    }

    /// Write one 4 byte page (Ultralight).
    pub fn write4(&self, data: &[u8], block: u8) -> Result<()> {
        expect_size(data, 4)?;
        self.engine.exchange(&Self::cmd(WRITE4).byte(block).bytes(data))?;
        Ok(())
    }

    /// Add `amount` to a value block. Without `auto_transfer` the result
    /// stays in the tag's transfer buffer until [`transfer`](Self::transfer).
    pub fn increment(&self, amount: i32, block: u8, auto_transfer: bool) -> Result<()> {
        self.value_op(INCREMENT, amount, block, auto_transfer)
    }

    /// Subtract `amount` from a value block.
    pub fn decrement(&self, amount: i32, block: u8, auto_transfer: bool) -> Result<()> {
        self.value_op(DECREMENT, amount, block, auto_transfer)
    }

    fn value_op(&self, code: u8, amount: i32, block: u8, auto_transfer: bool) -> Result<()> {
        let flag = if auto_transfer { 0x00 } else { 0x01 };
        self.engine
            .exchange(&Self::cmd(code).byte(flag).byte(block).le_i32(amount))?;
        Ok(())
    }

    /// Store the transfer buffer into `block`.
    pub fn transfer(&self, block: u8) -> Result<()> {
        self.engine.exchange(&Self::cmd(TRANSFER).byte(block))?;
        Ok(())
    }

    /// Put the active tag to sleep.
    pub fn halt(&self) -> Result<()> {
        self.engine.exchange(&Self::cmd(HALT))?;
        Ok(())
    }

    /// Load a key into the reader's key register.
    pub fn load_key(&self, source: KeySource) -> Result<()> {
        let cmd = match source {
            KeySource::Explicit(key) => Self::cmd(LOAD_KEY).bytes(key.as_bytes()),
            KeySource::Eeprom(index) => Self::cmd(LOAD_KEY_EEPROM).byte(index.get()),
        };
        self.engine.exchange(&cmd)?;
        Ok(())
    }

    /// Store a key in the reader's EEPROM slot `index`.
    pub fn store_key_in_eeprom(&self, index: KeyIndex, key: &MifareKey) -> Result<()> {
        self.engine.exchange(
            &Self::cmd(STORE_KEY_EEPROM)
                .byte(index.get())
                .bytes(key.as_bytes()),
        )?;
        Ok(())
    }

    /// MIFARE Classic authentication of `block`: load the key, then
    /// authenticate. These are two separate exchanges; callers sharing the
    /// engine must serialize the pair themselves if they need it atomic.
    pub fn authenticate(
        &self,
        key_type: KeyType,
        uid: &Uid,
        source: KeySource,
        block: u8,
    ) -> Result<()> {
        self.load_key(source)?;
        let code = match key_type {
            KeyType::A => AUTH_A,
            KeyType::B => AUTH_B,
        };
        debug!("authenticate block {} of {} with {}", block, uid, key_type);
        self.engine
            .exchange(&Self::cmd(code).byte(block).bytes(uid.as_bytes()))?;
        Ok(())
    }

    /// REQA. True when at least one idle tag answered.
    pub fn req_a(&self) -> Result<bool> {
        Ok(self.engine.exchange_optional(&Self::cmd(REQ_A))?.is_some())
    }

    /// WUPA. ATQA of the answering tags, `None` when nothing answered.
    pub fn wupa(&self) -> Result<Option<Atqa>> {
        self.engine
            .exchange_optional(&Self::cmd(WUPA))?
            .map(|p| Atqa::try_from(parser::slice_at(&p, 0, 2)?))
            .transpose()
    }

    /// Cascade level 1 anticollision. Returns the four UID bytes.
    pub fn anticollision_cl1(&self) -> Result<[u8; 4]> {
        let p = self
            .engine
            .exchange(&Self::cmd(CASCADE_1).byte(0x00))?;
        let uid = parser::array_at::<4>(&p, 0)?;
        if let Some(&bcc) = p.get(4) {
            let expected = uid.iter().fold(0u8, |acc, b| acc ^ b);
            if bcc != expected {
                return Err(Error::Format(format!(
                    "bcc mismatch: expected {:#04x}, got {:#04x}",
                    expected, bcc
                )));
            }
        }
        Ok(uid)
    }

    /// Cascade level 1 select. Returns the SAK.
    pub fn select_cl1(&self, uid: [u8; 4]) -> Result<u8> {
        let p = self
            .engine
            .exchange(&Self::cmd(CASCADE_1).byte(0x70).bytes(&uid))?;
        parser::byte_at(&p, 0)
    }

    /// Request for answer to select. The returned ATS starts with its own
    /// length byte.
    pub fn rats(&self) -> Result<Vec<u8>> {
        let p = self.engine.exchange(&Self::cmd(RATS))?;
        let len = parser::byte_at(&p, 0)? as usize;
        Ok(parser::slice_at(&p, 0, len)?.to_vec())
    }

    /// Raw ISO14443-3 frame exchange with the activated tag.
    pub fn exchange_iso14443_3(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.pass_through(EXCHANGE_3, data)
    }

    /// Raw ISO14443-4 block exchange with the activated tag.
    pub fn exchange_iso14443_4(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.pass_through(EXCHANGE_4, data)
    }

    fn pass_through(&self, code: u8, data: &[u8]) -> Result<Vec<u8>> {
        let p = self
            .engine
            .exchange(&Self::cmd(code).len_prefixed(data)?)?;
        Ok(parser::len_prefixed_at(&p, 0)?.to_vec())
    }
}

impl RawExchange for Iso14443a {
    fn transceive(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.exchange_iso14443_3(data)
    }
}

impl TagSource for Iso14443a {
    fn snapshot(&self) -> Result<Vec<Uid>> {
        self.show_cards()
    }
}

fn expect_size(data: &[u8], size: usize) -> Result<()> {
    if data.len() != size {
        return Err(Error::Validation(format!(
            "data must be {} bytes long, got {}",
            size,
            data.len()
        )));
    }
    Ok(())
}

/// Activation payload: UID, ATQA(2), SAK(1). The UID length comes from
/// the ATQA size bits.
fn decode_activation(p: &[u8]) -> Result<Iso14443aTarget> {
    parser::ensure_len(p, 3 + 4)?;
    let tail = p.len() - 3;
    let atqa = Atqa::try_from(parser::slice_at(p, tail, 2)?)?;
    let uid_len = atqa.uid_len()?;
    if uid_len != tail {
        return Err(Error::Format(format!(
            "atqa announces a {} byte uid, reply carries {}",
            uid_len, tail
        )));
    }
    Ok(Iso14443aTarget {
        uid: Uid::from_slice(&p[..uid_len]),
        atqa,
        sak: p[tail + 2],
    })
}

/// Card list payload: count, then (length, uid) entries.
fn decode_card_list(p: &[u8]) -> Result<Vec<Uid>> {
    let count = parser::byte_at(p, 0)? as usize;
    let mut idx = 1;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let uid = parser::len_prefixed_at(p, idx)?;
        idx += 1 + uid.len();
        out.push(Uid::from_slice(uid));
    }
    Ok(out)
}
