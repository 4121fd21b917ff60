// fixtures.rs: common test payloads and frames

use liblabid::protocol::{Crc16, Frame};

pub const VERSION_PAYLOAD: [u8; 5] = [0x02, 0x07, 0x13, 0x05, 0x1C];

pub fn sample_uid4() -> [u8; 4] {
    [0xDE, 0xAD, 0xBE, 0xEF]
}

pub fn sample_uid7() -> [u8; 7] {
    [0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]
}

/// ISO15693 UID as sent on the wire (least significant byte first).
pub fn sample_uid15693() -> [u8; 8] {
    hex::decode("11223344010804e0").unwrap().try_into().unwrap()
}

/// Activation payload of a 7 byte UID Ultralight: uid, ATQA 44 00, SAK 00.
pub fn ultralight_activation() -> Vec<u8> {
    let mut p = sample_uid7().to_vec();
    p.extend_from_slice(&[0x44, 0x00, 0x00]);
    p
}

/// Activation payload of a 4 byte UID Classic 1K: uid, ATQA 04 00, SAK 08.
pub fn classic_activation() -> Vec<u8> {
    let mut p = sample_uid4().to_vec();
    p.extend_from_slice(&[0x04, 0x00, 0x08]);
    p
}

/// Show cards payload listing the given UIDs.
pub fn card_list(uids: &[&[u8]]) -> Vec<u8> {
    let mut p = vec![uids.len() as u8];
    for uid in uids {
        p.push(uid.len() as u8);
        p.extend_from_slice(uid);
    }
    p
}

pub fn reply_frame(status: u8, payload: &[u8]) -> Vec<u8> {
    Frame::encode_reply(status, payload, &Crc16::default()).unwrap()
}

/// A reply captured from a reader: version request answered with
/// `VERSION_PAYLOAD`, framed with the default trailer.
pub fn captured_version_reply() -> Vec<u8> {
    reply_frame(0x00, &VERSION_PAYLOAD)
}
