//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common MockTransport setup so tests across the
//! crate and tests/ directory can reuse the same logic.
#![allow(dead_code)]

use std::sync::Arc;

use crate::engine::{EngineConfig, ProtocolEngine};
use crate::mifare::auth::{decrypt_cbc, encrypt_cbc, rotate_left};
use crate::protocol::{Crc16, Frame};
use crate::transport::MockTransport;
use crate::{Error, Result};

/// Engine over a fresh MockTransport. The returned mock shares state with
/// the one inside the engine.
#[doc(hidden)]
pub fn mock_engine() -> (MockTransport, Arc<ProtocolEngine>) {
    mock_engine_with_config(EngineConfig::default())
}

#[doc(hidden)]
pub fn mock_engine_with_config(config: EngineConfig) -> (MockTransport, Arc<ProtocolEngine>) {
    let mock = MockTransport::new();
    let engine = ProtocolEngine::from_parts(
        Box::new(mock.clone()),
        Box::new(Crc16::default()),
        config,
    );
    (mock, Arc::new(engine))
}

/// Engine whose mock is pre-seeded with `(status, payload)` replies.
#[doc(hidden)]
pub fn mock_engine_with_replies(
    replies: &[(u8, &[u8])],
) -> Result<(MockTransport, Arc<ProtocolEngine>)> {
    let (mock, engine) = mock_engine();
    for (status, payload) in replies {
        mock.push_reply(*status, payload)?;
    }
    Ok((mock, engine))
}

/// Responder for [`MockTransport::set_responder`] that plays an Ultralight C
/// tag behind the reader's ISO14443-3 pass-through (0xA0 0xD1).
#[doc(hidden)]
pub fn ultralight_c_responder(
    key: [u8; 16],
    rnd_b: [u8; 8],
) -> impl FnMut(&[u8]) -> Result<Vec<u8>> + Send + 'static {
    let trailer = Crc16::default();
    let mut rnd_b_enc: Option<[u8; 8]> = None;

    move |frame: &[u8]| {
        let body = Frame::decode_command(frame, &trailer)?;
        if body.len() < 3 || body[..2] != [0xA0, 0xD1] {
            return Frame::encode_reply(0x01, &[], &trailer);
        }
        let data = &body[3..];

        let answer = if data == [0x1A, 0x00] {
            let enc = encrypt_cbc(&key, &[0; 8], &rnd_b)?;
            let mut iv = [0u8; 8];
            iv.copy_from_slice(&enc);
            rnd_b_enc = Some(iv);
            [vec![0xAF], enc].concat()
        } else {
            let iv = rnd_b_enc
                .take()
                .ok_or_else(|| Error::Communication("step 2 before step 1".into()))?;
            if data.len() != 17 {
                return Frame::encode_reply(0x01, &[], &trailer);
            }
            let plain = decrypt_cbc(&key, &iv, &data[1..])?;
            if plain[8..] != rotate_left(&rnd_b)[..] {
                vec![0x00]
            } else {
                let mut last = [0u8; 8];
                last.copy_from_slice(&data[9..]);
                let enc = encrypt_cbc(&key, &last, &rotate_left(&plain[..8]))?;
                [vec![0x00], enc].concat()
            }
        };

        let mut payload = vec![answer.len() as u8];
        payload.extend_from_slice(&answer);
        Frame::encode_reply(0x00, &payload, &trailer)
    }
}
