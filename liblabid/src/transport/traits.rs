// liblabid/src/transport/traits.rs

use crate::Result;

/// Transport trait abstracts the byte stream away from protocol logic.
///
/// Implementations move whole frames: `receive` returns exactly one inbound
/// frame (or whatever arrived before the stream failed), and is bounded by
/// `timeout_ms`.
pub trait Transport: Send {
    /// Send one complete outbound frame.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive one inbound frame, waiting at most `timeout_ms` milliseconds.
    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>>;

    /// Drop any bytes already buffered on the input side. Called after a
    /// failed exchange so a late reply cannot be mistaken for the next one.
    fn discard_input(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        (**self).send(data)
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        (**self).receive(timeout_ms)
    }

    fn discard_input(&mut self) -> Result<()> {
        (**self).discard_input()
    }
}
