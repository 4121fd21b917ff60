// liblabid/src/standards/icode.rs

//! NXP ICODE SLI-S / SLI-L password extension of ISO15693.

use std::sync::Arc;

use derive_more::Display;

use crate::constants::CONTROL_ISO15693_CUSTOM;
use crate::engine::ProtocolEngine;
use crate::protocol::{Command, parser};
use crate::standards::iso15693::{MODE_ADDRESSED, MODE_NON_ADDRESSED, check_uid};
use crate::types::Uid;
use crate::{Error, Result};

/// IC manufacturer code of NXP
const MANUFACTURER_NXP: u8 = 0x04;

const GET_RANDOM_NUMBER: u8 = 0xB2;
const SET_PASSWORD: u8 = 0xB3;
const WRITE_PASSWORD: u8 = 0xB4;
const LOCK_PASSWORD: u8 = 0xB5;
const PROTECT_PAGE: u8 = 0xB6;
const LOCK_PAGE_PROTECTION: u8 = 0xB7;
const GET_MULTIPLE_BLOCK_PROTECTION_STATUS: u8 = 0xB8;
const DESTROY: u8 = 0xB9;
const ENABLE_PRIVACY: u8 = 0xBA;
const ENABLE_64BIT_PASSWORD: u8 = 0xBB;

/// Which password a command refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PasswordId {
    /// Read password (0x01).
    Read,
    /// Write password (0x02).
    Write,
    /// Privacy password (0x04).
    Privacy,
    /// Destroy password (0x08).
    Destroy,
    /// EAS/AFI password (0x10).
    Eas,
}

impl PasswordId {
    /// Wire identifier.
    pub fn byte(self) -> u8 {
        match self {
            Self::Read => 0x01,
            Self::Write => 0x02,
            Self::Privacy => 0x04,
            Self::Destroy => 0x08,
            Self::Eas => 0x10,
        }
    }
}

/// Protection condition of a memory page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageProtection {
    /// No password needed.
    Public,
    /// Read and write need the read password.
    ReadWriteByRead,
    /// Write needs the write password.
    WriteByWrite,
    /// Read needs the read password, write needs both.
    ReadAndWrite,
}

impl PageProtection {
    /// Wire encoding.
    pub fn byte(self) -> u8 {
        match self {
            Self::Public => 0x00,
            Self::ReadWriteByRead => 0x01,
            Self::WriteByWrite => 0x10,
            Self::ReadAndWrite => 0x11,
        }
    }
}

/// ICODE custom commands (control byte 0xB1).
#[derive(Debug, Clone)]
pub struct Icode {
    engine: Arc<ProtocolEngine>,
}

impl Icode {
    /// ICODE commands over a shared engine.
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self { engine }
    }

    /// Custom command header; `uid = None` selects non-addressed mode.
    fn cmd(code: u8, uid: Option<&Uid>) -> Result<Command> {
        let mode = if uid.is_some() {
            MODE_ADDRESSED
        } else {
            MODE_NON_ADDRESSED
        };
        let mut cmd = Command::new(CONTROL_ISO15693_CUSTOM, mode)
            .byte(code)
            .byte(MANUFACTURER_NXP);
        if let Some(uid) = uid {
            check_uid(uid)?;
            cmd = cmd.bytes(uid.as_bytes());
        }
        Ok(cmd)
    }

    fn run(&self, cmd: Command) -> Result<Vec<u8>> {
        self.engine.exchange(&cmd)
    }

    fn random_bytes(&self, uid: Option<&Uid>) -> Result<[u8; 2]> {
        let p = self.run(Self::cmd(GET_RANDOM_NUMBER, uid)?)?;
        parser::array_at::<2>(&p, 0)
    }

    /// Random number needed by [`set_password`](Self::set_password). The
    /// UID may be omitted only when the privacy password follows.
    pub fn get_random_number(&self, uid: Option<&Uid>) -> Result<u16> {
        Ok(u16::from_le_bytes(self.random_bytes(uid)?))
    }

    /// Present a password to the tag. Fetches a fresh random number first
    /// and sends the password XORed with it.
    pub fn set_password(&self, uid: Option<&Uid>, id: PasswordId, password: &[u8]) -> Result<()> {
        let pwd = check_password(password)?;
        if uid.is_none() && id != PasswordId::Privacy {
            return Err(Error::Validation(format!(
                "{} password needs an addressed tag",
                id
            )));
        }
        if let Some(uid) = uid {
            check_uid(uid)?;
        }

        let rnd = self.random_bytes(uid)?;
        let masked = [
            pwd[0] ^ rnd[0],
            pwd[1] ^ rnd[1],
            pwd[2] ^ rnd[0],
            pwd[3] ^ rnd[1],
        ];
        self.run(Self::cmd(SET_PASSWORD, uid)?.byte(id.byte()).bytes(&masked))?;
        Ok(())
    }

    /// Replace a password. The old one must have been presented.
    pub fn write_password(&self, uid: &Uid, id: PasswordId, password: &[u8]) -> Result<()> {
        let pwd = check_password(password)?;
        self.run(Self::cmd(WRITE_PASSWORD, Some(uid))?.byte(id.byte()).bytes(&pwd))?;
        Ok(())
    }

    /// Make a password permanent.
    pub fn lock_password(&self, uid: &Uid, id: PasswordId) -> Result<()> {
        self.run(Self::cmd(LOCK_PASSWORD, Some(uid))?.byte(id.byte()))?;
        Ok(())
    }

    /// Combine read and write passwords into one 64 bit password.
    pub fn enable_64bit_password_protection(&self, uid: &Uid) -> Result<()> {
        self.run(Self::cmd(ENABLE_64BIT_PASSWORD, Some(uid))?)?;
        Ok(())
    }

    /// Set the protection condition of a page.
    pub fn protect_page(&self, uid: &Uid, page: u8, protection: PageProtection) -> Result<()> {
        self.run(
            Self::cmd(PROTECT_PAGE, Some(uid))?
                .byte(page)
                .byte(protection.byte()),
        )?;
        Ok(())
    }

    /// Freeze the protection condition of a page.
    pub fn lock_page_protection(&self, uid: &Uid, page: u8) -> Result<()> {
        self.run(Self::cmd(LOCK_PAGE_PROTECTION, Some(uid))?.byte(page))?;
        Ok(())
    }

    /// One protection status byte per block.
    pub fn get_multiple_block_protection_status(
        &self,
        uid: &Uid,
        first: u8,
        n: u8,
    ) -> Result<Vec<u8>> {
        let p = self.run(
            Self::cmd(GET_MULTIPLE_BLOCK_PROTECTION_STATUS, Some(uid))?
                .byte(first)
                .byte(n),
        )?;
        Ok(parser::slice_at(&p, 0, n as usize)?.to_vec())
    }

    /// Permanently disable the tag.
    pub fn destroy(&self, uid: &Uid) -> Result<()> {
        self.run(Self::cmd(DESTROY, Some(uid))?)?;
        Ok(())
    }

    /// Hide the tag until the privacy password is presented.
    pub fn enable_privacy_mode(&self, uid: &Uid) -> Result<()> {
        self.run(Self::cmd(ENABLE_PRIVACY, Some(uid))?)?;
        Ok(())
    }
}

fn check_password(password: &[u8]) -> Result<[u8; 4]> {
    password.try_into().map_err(|_| {
        Error::Validation(format!(
            "icode password must be 4 bytes long, got {}",
            password.len()
        ))
    })
}
