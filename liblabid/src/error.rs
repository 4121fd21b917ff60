// liblabid/src/error.rs

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// Caller precondition violated; raised before any I/O.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport failure: I/O error, closed link, unexpected bytes.
    #[error("communication error: {0}")]
    Communication(String),

    /// Frame trailer did not validate.
    #[error("checksum mismatch: expected {expected:02x?}, got {actual:02x?}")]
    ChecksumMismatch { expected: Vec<u8>, actual: Vec<u8> },

    /// Length byte disagrees with the bytes received.
    #[error("frame length mismatch: declared {declared}, received {received}")]
    FrameLength { declared: usize, received: usize },

    /// Payload too short for its declared shape.
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Payload bytes violate their encoding (redundancy, reserved values).
    #[error("format error: {0}")]
    Format(String),

    /// Nonzero reader status. Never retried.
    #[error("reader error: status={code:#04x}")]
    Protocol { code: u8 },

    /// No complete frame within the timeout.
    #[error("operation timed out")]
    Timeout,

    /// Authentication could not be carried out (not a wrong key).
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Liveness probe failed; the connection is unusable.
    #[error("device not present: {0}")]
    DeviceNotPresent(String),
}

impl Error {
    /// Transient failures are worth repeating the whole exchange for.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Communication(_)
                | Self::ChecksumMismatch { .. }
                | Self::FrameLength { .. }
                | Self::Timeout
        )
    }

    /// Reader status code, if this is a reader-reported failure.
    pub fn status_code(&self) -> Option<u8> {
        match self {
            Self::Protocol { code } => Some(*code),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => Self::Timeout,
            _ => Self::Communication(e.to_string()),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
