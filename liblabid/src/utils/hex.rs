//! Hexadecimal helpers used for logging frames and displaying identifiers.
//!
//! Compact and separated renderings plus a whitespace-tolerant parser for
//! fixtures and command-line input.

use std::fmt::Write;

use crate::{Error, Result};

/// Lowercase hex without separators: `&[0xde, 0xad]` -> `"dead"`.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        // writing into a String cannot fail
        let _ = write!(s, "{:02x}", b);
        s
    })
}

/// Uppercase hex with `sep` between bytes: `(&[0xde, 0xad], ':')` -> `"DE:AD"`.
///
/// This is the form tag identifiers are usually printed in.
pub fn bytes_to_hex_sep(bytes: &[u8], sep: char) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            s.push(sep);
        }
        let _ = write!(s, "{:02X}", b);
    }
    s
}

/// Lowercase hex with a single space between bytes, used for frame traces.
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    bytes_to_hex_sep(bytes, ' ').to_lowercase()
}

/// Parse a hex string into bytes, ignoring ASCII whitespace and `:` separators.
pub fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = s
        .bytes()
        .filter(|c| !c.is_ascii_whitespace() && *c != b':')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(Error::Validation("hex string has odd length".into()));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair)
                .map_err(|_| Error::Validation("hex string is not ascii".into()))?;
            u8::from_str_radix(text, 16)
                .map_err(|e| Error::Validation(format!("invalid hex pair '{}': {}", text, e)))
        })
        .collect()
}
