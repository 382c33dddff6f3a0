//! Little-endian base-128 integers.
//!
//! Values are emitted in groups of seven bits, least significant group
//! first, with bit 7 of every byte but the last flagging continuation.
//! Decoding terminates at a fixed shift rather than on the continuation bit
//! alone: a 64-bit accumulator keeps all eight bits of the byte at shift 56,
//! which caps the encoding at nine bytes and lets `u64::MAX` round-trip. A
//! 32-bit accumulator terminates on the byte at shift 28, where only four
//! bits still have a place to go; set bits above them make the byte invalid
//! instead of vanishing.

use crate::error::DecodeError;

/// Longest possible encoding, reached by values with bit 56 or higher set.
pub(crate) const MAX_BYTES: usize = 9;

/// Encodes `x` into the front of `buf` and returns the number of bytes
/// written. `buf` must hold at least [`MAX_BYTES`].
pub(crate) fn put(mut x: u64, buf: &mut [u8]) -> usize {
    let mut i = 0;
    while x > 0x7f && i < MAX_BYTES - 1 {
        buf[i] = x as u8 | 0x80;
        x >>= 7;
        i += 1;
    }
    buf[i] = x as u8;
    i + 1
}

/// Decodes with a 64-bit accumulator, returning the value and the number of
/// bytes consumed.
pub(crate) fn take64(buf: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut x = 0u64;
    for (i, &b) in buf.iter().enumerate() {
        let shift = 7 * i as u32;
        if shift == 56 {
            return Ok((x | (b as u64) << 56, i + 1));
        }
        x |= ((b & 0x7f) as u64) << shift;
        if b & 0x80 == 0 {
            return Ok((x, i + 1));
        }
    }
    Err(DecodeError::Incomplete)
}

/// Decodes with a 32-bit accumulator. The byte at shift 28 always ends the
/// sequence; bits of it past the accumulator width are rejected.
pub(crate) fn take32(buf: &[u8]) -> Result<(u32, usize), DecodeError> {
    let mut x = 0u32;
    for (i, &b) in buf.iter().enumerate() {
        let shift = 7 * i as u32;
        if shift == 28 {
            if b & 0xf0 != 0 {
                return Err(DecodeError::SchemaMismatch(b));
            }
            return Ok((x | (b as u32) << 28, i + 1));
        }
        x |= ((b & 0x7f) as u32) << shift;
        if b & 0x80 == 0 {
            return Ok((x, i + 1));
        }
    }
    Err(DecodeError::Incomplete)
}
