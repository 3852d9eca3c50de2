use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};

/// A u64 never needs more than ten 7-bit groups.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` to `dst` as a varint.
///
/// Every byte but the last has the continuation bit (0x80) set. Unsigned
/// only, no zigzag.
pub fn encode_varint(mut value: u64, dst: &mut BytesMut) {
    while value > 0x7F {
        dst.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    dst.put_u8(value as u8);
}

/// Number of bytes `value` occupies when varint-encoded.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Decode a varint from the start of `src`.
///
/// Returns the value and the number of bytes consumed. Fails with
/// [`WireError::TruncatedInput`] if `src` ends before a byte with the
/// continuation bit clear. Groups that would overflow 64 bits are
/// [`WireError::MalformedMessage`].
pub fn decode_varint(src: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (index, &byte) in src.iter().enumerate() {
        // The tenth group holds bit 63 only.
        if index == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(WireError::MalformedMessage(
                "varint overflows 64 bits".to_string(),
            ));
        }
        value |= u64::from(byte & 0x7F) << (7 * index);
        if byte & 0x80 == 0 {
            return Ok((value, index + 1));
        }
    }
    Err(WireError::TruncatedInput)
}
