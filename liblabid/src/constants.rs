// liblabid/src/constants.rs
//! Wire constants shared by the engine and the command sets

/// Inbound header: length(1) + reserved(3) + status(1)
pub const FRAME_HEADER_LEN: usize = 5;

/// The length byte limits a frame to 255 bytes
pub const FRAME_MAX_LEN: usize = 255;

/// Status byte of a successful reply
pub const STATUS_OK: u8 = 0x00;

/// Control byte: reader management commands
pub const CONTROL_READER: u8 = 0x00;
/// Control byte: MIFARE macro commands
pub const CONTROL_MIFARE_MACRO: u8 = 0x04;
/// Control byte: ISO14443A commands
pub const CONTROL_ISO14443A: u8 = 0xA0;
/// Control byte: ISO15693 standard commands
pub const CONTROL_ISO15693: u8 = 0xB0;
/// Control byte: ISO15693 custom (manufacturer) commands
pub const CONTROL_ISO15693_CUSTOM: u8 = 0xB1;
/// Control byte: ISO14443B commands
pub const CONTROL_ISO14443B: u8 = 0xC0;
/// Control byte: ISO14443B ST custom commands
pub const CONTROL_ISO14443B_ST: u8 = 0xC1;
/// Control byte: Picopass commands
pub const CONTROL_PICOPASS: u8 = 0xC2;

/// Reader command: firmware version
pub const READER_GET_VERSION: u8 = 0x01;
/// Reader command: reader serial number
pub const READER_GET_UID: u8 = 0x02;
