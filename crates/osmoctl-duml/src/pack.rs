//! Length-prefixed string packing used inside DUML payloads.

use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};

/// Append a string with a one-byte length prefix.
///
/// Panics if the string is longer than 255 bytes; the protocol has no way
/// to express it.
pub fn put_string(dst: &mut BytesMut, s: &str) {
    assert!(
        s.len() <= u8::MAX as usize,
        "string length {} exceeds the one-byte prefix",
        s.len()
    );
    dst.put_u8(s.len() as u8);
    dst.put_slice(s.as_bytes());
}

/// Append a URL with a two-byte little-endian length prefix.
///
/// Panics if the URL is longer than 65535 bytes.
pub fn put_url(dst: &mut BytesMut, url: &str) {
    assert!(
        url.len() <= u16::MAX as usize,
        "URL length {} exceeds the two-byte prefix",
        url.len()
    );
    dst.put_u16_le(url.len() as u16);
    dst.put_slice(url.as_bytes());
}

/// Extract a string with a two-byte big-endian length prefix from the
/// start of `src`.
pub fn unpack_string_u16be(src: &[u8]) -> Result<String> {
    if src.len() < 2 {
        return Err(WireError::PayloadTooShort {
            needed: 2,
            got: src.len(),
        });
    }
    let len = u16::from_be_bytes([src[0], src[1]]) as usize;
    if src.len() < 2 + len {
        return Err(WireError::StringOutOfBounds {
            needed: 2 + len,
            got: src.len(),
        });
    }
    Ok(String::from_utf8_lossy(&src[2..2 + len]).into_owned())
}
