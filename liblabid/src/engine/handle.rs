// liblabid/src/engine/handle.rs

use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::constants::{CONTROL_READER, READER_GET_UID, READER_GET_VERSION};
use crate::engine::builder::EngineBuilder;
use crate::engine::config::EngineConfig;
use crate::protocol::trailer::{Crc16, Trailer};
use crate::protocol::{Command, Frame, Reply};
use crate::transport::Transport;
use crate::types::{SoftwareVersion, Uid};
use crate::utils::bytes_to_hex_spaced;
use crate::{Error, Result};

/// Owner of one reader connection.
///
/// Every exchange (one frame out, one frame back) runs under a single lock,
/// so command sets sharing the engine through an `Arc` may interleave between
/// exchanges but never within one. Multi-exchange operations are not atomic.
pub struct ProtocolEngine {
    transport: Mutex<Box<dyn Transport>>,
    trailer: Box<dyn Trailer>,
    config: EngineConfig,
}

impl std::fmt::Debug for ProtocolEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolEngine")
            .field("trailer", &self.trailer)
            .field("config", &self.config)
            .finish()
    }
}

impl ProtocolEngine {
    /// Engine over `transport` with the default trailer and configuration.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::from_parts(
            transport,
            Box::new(Crc16::default()),
            EngineConfig::default(),
        )
    }

    /// Start an [`EngineBuilder`].
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn from_parts(
        transport: Box<dyn Transport>,
        trailer: Box<dyn Trailer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            transport: Mutex::new(transport),
            trailer,
            config,
        }
    }

    /// Active timeout and retry policy.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Trailer used on every frame.
    pub fn trailer(&self) -> &dyn Trailer {
        self.trailer.as_ref()
    }

    /// Run one command and return the reply payload.
    ///
    /// Transient failures are retried up to the configured bound; a nonzero
    /// reader status is returned at once as [`Error::Protocol`].
    pub fn exchange(&self, cmd: &Command) -> Result<Vec<u8>> {
        self.exchange_with_retries(cmd, self.config.retries)
    }

    /// Like [`exchange`](Self::exchange), with a reader-reported failure
    /// mapped to `None`. For commands whose failure status means "no tag".
    pub fn exchange_optional(&self, cmd: &Command) -> Result<Option<Vec<u8>>> {
        match self.exchange(cmd) {
            Ok(payload) => Ok(Some(payload)),
            Err(Error::Protocol { code }) => {
                debug!(
                    "{:#04x}/{:#04x}: status {:#04x}, no result",
                    cmd.control(),
                    cmd.code(),
                    code
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Run one command with an explicit retry bound.
    pub fn exchange_with_retries(&self, cmd: &Command, retries: u32) -> Result<Vec<u8>> {
        let frame = Frame::encode(&cmd.encode(), self.trailer.as_ref())?;

        let mut attempt = 0u32;
        loop {
            match self.attempt(&frame) {
                Ok(reply) if reply.is_success() => return Ok(reply.payload),
                Ok(reply) => {
                    return Err(Error::Protocol { code: reply.status });
                }
                Err(e) if e.is_transient() && attempt < retries => {
                    attempt += 1;
                    warn!(
                        "{:#04x}/{:#04x}: {} (retry {}/{})",
                        cmd.control(),
                        cmd.code(),
                        e,
                        attempt,
                        retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Boundary form of [`exchange`](Self::exchange): `body` is the control
    /// byte, the command code and the parameters.
    pub fn exchange_bytes(&self, body: &[u8]) -> Result<Vec<u8>> {
        let cmd = Command::try_from(body)?;
        self.exchange(&cmd)
    }

    /// One request/response pair under the lock.
    fn attempt(&self, frame: &[u8]) -> Result<Reply> {
        let mut transport = self.transport.lock();

        let result = transport.send(frame).and_then(|_| {
            trace!("tx: {}", bytes_to_hex_spaced(frame));
            let raw = transport.receive(self.config.timeout_ms)?;
            trace!("rx: {}", bytes_to_hex_spaced(&raw));
            Frame::decode(&raw, self.trailer.as_ref())
        });

        if let Err(e) = &result {
            if e.is_transient() {
                if let Err(d) = transport.discard_input() {
                    debug!("discard after failed exchange: {}", d);
                }
            }
        }
        result
    }

    /// Raw firmware version bytes.
    pub fn software_version_bytes(&self) -> Result<Vec<u8>> {
        self.exchange(&Command::new(CONTROL_READER, READER_GET_VERSION))
            .map_err(|e| Error::DeviceNotPresent(e.to_string()))
    }

    /// Firmware version. Failure means the reader is not answering and the
    /// connection should be treated as unusable.
    pub fn software_version(&self) -> Result<SoftwareVersion> {
        let raw = self.software_version_bytes()?;
        SoftwareVersion::try_from(raw.as_slice())
            .map_err(|e| Error::DeviceNotPresent(e.to_string()))
    }

    /// Liveness probe.
    pub fn probe(&self) -> Result<SoftwareVersion> {
        let version = self.software_version()?;
        info!("reader firmware {}", version);
        Ok(version)
    }

    /// Serial number of the reader itself.
    pub fn reader_uid(&self) -> Result<Uid> {
        let payload = self.exchange(&Command::new(CONTROL_READER, READER_GET_UID))?;
        if payload.is_empty() {
            return Err(Error::Format("empty reader uid".into()));
        }
        Ok(Uid::from(payload))
    }
}
