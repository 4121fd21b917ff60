// liblabid/src/transport/mock.rs

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::protocol::{Crc16, Frame};
use crate::transport::traits::Transport;
use crate::{Error, Result};

type Responder = Box<dyn FnMut(&[u8]) -> Result<Vec<u8>> + Send>;

#[derive(Default)]
struct MockState {
    sent: Vec<Vec<u8>>,
    responses: VecDeque<Result<Vec<u8>>>,
    responder: Option<Responder>,
    receives: usize,
    discards: usize,
}

/// Mock transport for tests. It records sent frames and returns queued
/// responses; once the queue is empty an optional responder computes the
/// reply from the last sent frame, otherwise `receive` times out.
///
/// Clones share state, so a test can keep a handle after giving the
/// transport to an engine.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw inbound frame.
    pub fn push_response(&self, frame: Vec<u8>) {
        self.state.lock().responses.push_back(Ok(frame));
    }

    /// Queue a well-formed reply framed with the default trailer.
    pub fn push_reply(&self, status: u8, payload: &[u8]) -> Result<()> {
        let frame = Frame::encode_reply(status, payload, &Crc16::default())?;
        self.push_response(frame);
        Ok(())
    }

    /// Queue a failure returned by `receive`.
    pub fn push_error(&self, err: Error) {
        self.state.lock().responses.push_back(Err(err));
    }

    /// Queue one `receive` that times out.
    pub fn push_timeout(&self) {
        self.push_error(Error::Timeout);
    }

    /// Compute replies from the last sent frame once the queue runs dry.
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Result<Vec<u8>> + Send + 'static,
    {
        self.state.lock().responder = Some(Box::new(responder));
    }

    /// Every frame sent so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.lock().sent.clone()
    }

    /// Command bodies (control, code, params) of every frame sent so far,
    /// assuming the default trailer.
    pub fn sent_bodies(&self) -> Vec<Vec<u8>> {
        self.sent()
            .iter()
            .filter_map(|f| Frame::decode_command(f, &Crc16::default()).ok())
            .collect()
    }

    /// Number of `receive` calls.
    pub fn receive_count(&self) -> usize {
        self.state.lock().receives
    }

    /// Number of `discard_input` calls.
    pub fn discard_count(&self) -> usize {
        self.state.lock().discards
    }

    /// Queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.state.lock().responses.len()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.lock();
        f.debug_struct("MockTransport")
            .field("sent", &s.sent.len())
            .field("pending", &s.responses.len())
            .field("responder", &s.responder.is_some())
            .finish()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.state.lock().sent.push(data.to_vec());
        Ok(())
    }

    fn receive(&mut self, _timeout_ms: u64) -> Result<Vec<u8>> {
        let mut s = self.state.lock();
        s.receives += 1;
        if let Some(r) = s.responses.pop_front() {
            return r;
        }
        let last = s.sent.last().cloned();
        match (s.responder.as_mut(), last) {
            (Some(responder), Some(frame)) => responder(&frame),
            _ => Err(Error::Timeout),
        }
    }

    fn discard_input(&mut self) -> Result<()> {
        self.state.lock().discards += 1;
        Ok(())
    }
}
