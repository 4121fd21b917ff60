// liblabid/src/protocol/frame.rs

use crate::constants::{FRAME_HEADER_LEN, FRAME_MAX_LEN, STATUS_OK};
use crate::protocol::trailer::Trailer;
use crate::{Error, Result};

/// Reader wire frame helper.
///
/// Outbound: [Len(1)] [Control(1)] [Code(1)] [Params(n)] [Trailer]
/// Inbound:  [Len(1)] [Reserved(3)] [Status(1)] [Payload(n)] [Trailer]
///
/// `Len` counts every byte of the frame, itself and the trailer included.
pub struct Frame;

/// A decoded inbound frame. The status has not been interpreted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Bytes 1..4 of the header, not interpreted.
    pub reserved: [u8; 3],
    /// Reader status; zero is success.
    pub status: u8,
    /// Bytes between the status and the trailer.
    pub payload: Vec<u8>,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

impl Frame {
    /// Wrap a command body (control, code, params) into an outbound frame.
    pub fn encode(body: &[u8], trailer: &dyn Trailer) -> Result<Vec<u8>> {
        let total = 1 + body.len() + trailer.len();
        if total > FRAME_MAX_LEN {
            return Err(Error::Validation(format!(
                "command of {} bytes does not fit in a {} byte frame",
                body.len(),
                FRAME_MAX_LEN
            )));
        }

        let mut out = Vec::with_capacity(total);
        out.push(total as u8);
        out.extend_from_slice(body);
        let t = trailer.compute(&out);
        out.extend_from_slice(&t);
        Ok(out)
    }

    /// Validate an inbound frame and split it into status and payload.
    pub fn decode(frame: &[u8], trailer: &dyn Trailer) -> Result<Reply> {
        let declared = frame.first().copied().unwrap_or(0) as usize;
        if frame.len() != declared {
            return Err(Error::FrameLength {
                declared,
                received: frame.len(),
            });
        }

        let min = FRAME_HEADER_LEN + trailer.len();
        if declared < min {
            return Err(Error::FrameLength {
                declared,
                received: frame.len(),
            });
        }

        let (data, t) = frame.split_at(declared - trailer.len());
        trailer.verify(data, t)?;

        Ok(Reply {
            reserved: [data[1], data[2], data[3]],
            status: data[4],
            payload: data[FRAME_HEADER_LEN..].to_vec(),
        })
    }

    /// Build an inbound frame, as a reader would. Used by simulators and tests.
    pub fn encode_reply(status: u8, payload: &[u8], trailer: &dyn Trailer) -> Result<Vec<u8>> {
        let total = FRAME_HEADER_LEN + payload.len() + trailer.len();
        if total > FRAME_MAX_LEN {
            return Err(Error::Validation(format!(
                "payload of {} bytes does not fit in a {} byte frame",
                payload.len(),
                FRAME_MAX_LEN
            )));
        }

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&[total as u8, 0x00, 0x00, 0x00, status]);
        out.extend_from_slice(payload);
        let t = trailer.compute(&out);
        out.extend_from_slice(&t);
        Ok(out)
    }

    /// Strip the length prefix and trailer from an outbound frame, returning
    /// the command body. Used by simulators to see what the host asked for.
    pub fn decode_command(frame: &[u8], trailer: &dyn Trailer) -> Result<Vec<u8>> {
        let declared = frame.first().copied().unwrap_or(0) as usize;
        if frame.len() != declared || declared < 1 + 2 + trailer.len() {
            return Err(Error::FrameLength {
                declared,
                received: frame.len(),
            });
        }
        let (data, t) = frame.split_at(declared - trailer.len());
        trailer.verify(data, t)?;
        Ok(data[1..].to_vec())
    }
}
