// liblabid/src/protocol/command.rs

use crate::{Error, Result};

/// One reader command: the control byte selecting the standard/family, the
/// family-specific command code and its parameter bytes.
///
/// ISO15693 families put the request mode where other families put the
/// command code; the actual ISO15693 command then leads the parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    control: u8,
    code: u8,
    params: Vec<u8>,
}

impl Command {
    /// Command with no parameters yet.
    pub fn new(control: u8, code: u8) -> Self {
        Self {
            control,
            code,
            params: Vec::new(),
        }
    }

    /// Builder-style: append one parameter byte.
    pub fn byte(mut self, b: u8) -> Self {
        self.params.push(b);
        self
    }

    /// Builder-style: append parameter bytes.
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.params.extend_from_slice(data);
        self
    }

    /// Builder-style: append a little-endian u16.
    pub fn le_u16(self, v: u16) -> Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Builder-style: append a little-endian i32.
    pub fn le_i32(self, v: i32) -> Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Builder-style: append a length byte followed by `data`.
    pub fn len_prefixed(self, data: &[u8]) -> Result<Self> {
        let len = u8::try_from(data.len()).map_err(|_| {
            Error::Validation(format!("{} bytes do not fit a length prefix", data.len()))
        })?;
        Ok(self.byte(len).bytes(data))
    }

    /// Control byte.
    pub fn control(&self) -> u8 {
        self.control
    }

    /// Command code (or ISO15693 request mode).
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Parameter bytes.
    pub fn params(&self) -> &[u8] {
        &self.params
    }

    /// Body as sent between the length byte and the trailer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 + self.params.len());
        buf.push(self.control);
        buf.push(self.code);
        buf.extend_from_slice(&self.params);
        buf
    }
}

impl TryFrom<&[u8]> for Command {
    type Error = Error;

    /// Parse a raw body: control, code, params.
    fn try_from(body: &[u8]) -> Result<Self> {
        match body {
            [control, code, params @ ..] => Ok(Self {
                control: *control,
                code: *code,
                params: params.to_vec(),
            }),
            _ => Err(Error::Validation(format!(
                "command needs a control byte and a code, got {} bytes",
                body.len()
            ))),
        }
    }
}
