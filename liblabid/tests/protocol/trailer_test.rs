use liblabid::protocol::{Crc16, Frame};

use crate::common;

#[test]
fn identify_finds_default_from_captures() {
    let captures = [
        common::captured_version_reply(),
        common::reply_frame(0x01, &[]),
        common::reply_frame(0x00, &common::ultralight_activation()),
    ];
    let found = Crc16::identify(captures.iter().map(Vec::as_slice)).unwrap();
    assert_eq!(found, Crc16::X25);
    assert_eq!(found.name(), "X-25");
}

#[test]
fn identify_other_presets() {
    for preset in Crc16::PRESETS {
        let frame = Frame::encode_reply(0x00, &[0xCA, 0xFE], &preset).unwrap();
        assert_eq!(Crc16::identify([frame.as_slice()]), Some(preset));
    }
}

#[test]
fn identify_needs_captures_that_agree() {
    let a = Frame::encode_reply(0x00, &[1], &Crc16::X25).unwrap();
    let b = Frame::encode_reply(0x00, &[1], &Crc16::ISO14443A).unwrap();
    assert_eq!(Crc16::identify([a.as_slice(), b.as_slice()]), None);
    assert_eq!(Crc16::identify(std::iter::empty::<&[u8]>()), None);
}
