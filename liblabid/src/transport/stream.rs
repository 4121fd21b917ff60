// liblabid/src/transport/stream.rs

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::transport::traits::Transport;
use crate::utils::{bytes_to_hex_spaced, ms, remaining_ms};
use crate::{Error, Result};

/// Baud rate the readers ship with.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// How long `discard_input` waits for stray bytes.
const DRAIN_TIMEOUT_MS: u64 = 20;

/// A blocking byte stream whose read timeout can be adjusted per read.
pub trait ByteStream: Read + Write + Send {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl ByteStream for TcpStream {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        TcpStream::set_read_timeout(self, Some(timeout))
    }
}

#[cfg(feature = "serial")]
impl ByteStream for Box<dyn serialport::SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.as_mut().set_timeout(timeout).map_err(io::Error::from)
    }
}

/// Frame transport over any [`ByteStream`]. Inbound frames are delimited by
/// their leading length byte.
pub struct StreamTransport<S> {
    stream: S,
}

/// Reader reached over a TCP socket (serial-to-ethernet bridges).
pub type TcpTransport = StreamTransport<TcpStream>;

/// Reader reached over a serial port.
#[cfg(feature = "serial")]
pub type SerialTransport = StreamTransport<Box<dyn serialport::SerialPort>>;

impl<S: ByteStream> StreamTransport<S> {
    /// Wrap an open stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Fill `buf` completely before the deadline.
    fn read_full(&mut self, buf: &mut [u8], start: Instant, timeout_ms: u64) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let left = remaining_ms(start, timeout_ms).ok_or(Error::Timeout)?;
            self.stream.set_read_timeout(ms(left))?;
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return Err(Error::Communication("connection closed".into())),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl TcpTransport {
    /// Connect to a reader exposed on a TCP port.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        debug!("connected to {:?}", stream.peer_addr().ok());
        Ok(Self::new(stream))
    }
}

#[cfg(feature = "serial")]
impl SerialTransport {
    /// Open a serial port by path (`/dev/ttyUSB0`, `COM3`).
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(crate::utils::default_read_timeout())
            .open()
            .map_err(|e| Error::Communication(format!("cannot open {}: {}", path, e)))?;
        debug!("opened {} at {} baud", path, baud_rate);
        Ok(Self::new(port))
    }
}

impl<S: ByteStream> Transport for StreamTransport<S> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        trace!("tx: {}", bytes_to_hex_spaced(data));
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        let start = Instant::now();
        let mut len = [0u8; 1];
        self.read_full(&mut len, start, timeout_ms)?;

        let mut frame = vec![0u8; (len[0] as usize).max(1)];
        frame[0] = len[0];
        self.read_full(&mut frame[1..], start, timeout_ms)?;
        trace!("rx: {}", bytes_to_hex_spaced(&frame));
        Ok(frame)
    }

    fn discard_input(&mut self) -> Result<()> {
        let mut scratch = [0u8; 64];
        self.stream.set_read_timeout(ms(DRAIN_TIMEOUT_MS))?;
        let mut dropped = 0usize;
        loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => break,
                Ok(n) => dropped += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // timeout: nothing left
                Err(_) => break,
            }
        }
        if dropped > 0 {
            debug!("discarded {} stale bytes", dropped);
        }
        Ok(())
    }
}
