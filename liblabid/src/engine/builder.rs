// liblabid/src/engine/builder.rs

use std::sync::Arc;

use crate::engine::config::EngineConfig;
use crate::engine::handle::ProtocolEngine;
use crate::protocol::trailer::{Crc16, Trailer};
use crate::transport::Transport;
use crate::{Error, Result};

/// Helper to construct a ProtocolEngine with optional configuration.
pub struct EngineBuilder {
    transport: Option<Box<dyn Transport>>,
    trailer: Box<dyn Trailer>,
    config: EngineConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// No transport, CRC-16/X-25 trailer, default configuration.
    pub fn new() -> Self {
        Self {
            transport: None,
            trailer: Box::new(Crc16::default()),
            config: EngineConfig::default(),
        }
    }

    /// Provide an already-created transport instance (e.g. MockTransport)
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the default CRC-16/X-25 trailer.
    pub fn with_trailer<T: Trailer + 'static>(mut self, trailer: T) -> Self {
        self.trailer = Box::new(trailer);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Consume the builder and return an engine.
    /// Requires a transport to be provided.
    pub fn build(self) -> Result<ProtocolEngine> {
        match self.transport {
            Some(t) => Ok(ProtocolEngine::from_parts(t, self.trailer, self.config)),
            None => Err(Error::Validation("no transport configured".into())),
        }
    }

    /// Build, then probe the reader. The engine is returned shared, ready to
    /// hand to several command sets.
    pub fn connect(self) -> Result<Arc<ProtocolEngine>> {
        let engine = self.build()?;
        engine.probe()?;
        Ok(Arc::new(engine))
    }
}
