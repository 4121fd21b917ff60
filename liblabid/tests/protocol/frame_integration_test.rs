use liblabid::protocol::{Crc16, Frame, Trailer};
use liblabid::Error;
use proptest::prelude::*;

use crate::common;

#[test]
fn captured_reply_decodes() {
    let frame = common::captured_version_reply();
    let reply = Frame::decode(&frame, &Crc16::default()).unwrap();
    assert!(reply.is_success());
    assert_eq!(reply.reserved, [0, 0, 0]);
    assert_eq!(reply.payload, common::VERSION_PAYLOAD.to_vec());
}

#[test]
fn reply_under_wrong_trailer_is_a_checksum_error() {
    let frame = common::captured_version_reply();
    assert!(matches!(
        Frame::decode(&frame, &Crc16::ISO14443A),
        Err(Error::ChecksumMismatch { .. })
    ));
}

#[test]
fn declared_length_shorter_than_header() {
    // length byte says 4, which cannot hold header and trailer
    let frame = [0x04, 0x00, 0x00, 0x00];
    assert!(matches!(
        Frame::decode(&frame, &Crc16::default()),
        Err(Error::FrameLength { declared: 4, .. })
    ));
}

#[test]
fn custom_trailer_strategy() {
    /// One byte XOR of every preceding byte.
    #[derive(Debug)]
    struct Lrc;

    impl Trailer for Lrc {
        fn len(&self) -> usize {
            1
        }

        fn compute(&self, data: &[u8]) -> Vec<u8> {
            vec![data.iter().fold(0u8, |acc, b| acc ^ b)]
        }
    }

    let frame = Frame::encode_reply(0x00, &[0x10, 0x20], &Lrc).unwrap();
    assert_eq!(frame.len(), 8);
    assert_eq!(Frame::decode(&frame, &Lrc).unwrap().payload, vec![0x10, 0x20]);
}

proptest! {
    #[test]
    fn any_single_bit_flip_is_detected(payload in proptest::collection::vec(any::<u8>(), 0..64), bit in 0usize..512) {
        let mut frame = Frame::encode_reply(0x00, &payload, &Crc16::default()).unwrap();
        // leave the length byte alone, that is a different error
        let idx = 1 + (bit / 8) % (frame.len() - 1);
        frame[idx] ^= 1 << (bit % 8);
        prop_assert!(Frame::decode(&frame, &Crc16::default()).is_err());
    }

    #[test]
    fn total_length_counts_every_byte(body in proptest::collection::vec(any::<u8>(), 2..100)) {
        let frame = Frame::encode(&body, &Crc16::default()).unwrap();
        prop_assert_eq!(frame[0] as usize, frame.len());
        prop_assert_eq!(frame.len(), body.len() + 3);
    }
}
