// liblabid/src/standards/picopass.rs

use std::sync::Arc;

use crate::constants::CONTROL_PICOPASS;
use crate::engine::ProtocolEngine;
use crate::protocol::{Command, parser};
use crate::standards::TagSource;
use crate::types::Uid;
use crate::Result;

const SELECT_GET_UID: u8 = 0x81;

/// Picopass contactless smartcard command set.
#[derive(Debug, Clone)]
pub struct Picopass {
    engine: Arc<ProtocolEngine>,
}

impl Picopass {
    /// Picopass commands over a shared engine.
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self { engine }
    }

    /// Select the card in the field and read its UID.
    pub fn get_uid(&self) -> Result<Option<Uid>> {
        let cmd = Command::new(CONTROL_PICOPASS, SELECT_GET_UID);
        match self.engine.exchange_optional(&cmd)? {
            Some(p) => Ok(Some(Uid::from_slice(parser::len_prefixed_at(&p, 0)?))),
            None => Ok(None),
        }
    }
}

impl TagSource for Picopass {
    fn snapshot(&self) -> Result<Vec<Uid>> {
        Ok(self.get_uid()?.into_iter().collect())
    }
}
