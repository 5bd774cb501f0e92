//! LEB128 variable-width integers, as used for keys, lengths and `uint64` fields.

use crate::Error;
use crate::Result;

/// A u64 never needs more than ten 7-bit groups.
pub const MAX_VARINT_LEN: usize = 10;

/// Appends `v` to `buf` as a varint.
#[inline]
pub fn encode_varint(v: u64, buf: &mut Vec<u8>) {
    let (bytes, len) = varint_bytes(v);
    buf.extend_from_slice(&bytes[..len]);
}

/// Encodes `v` into a fixed array, returning the array and the number of bytes used.
#[inline]
pub fn varint_bytes(mut v: u64) -> ([u8; MAX_VARINT_LEN], usize) {
    let mut out = [0u8; MAX_VARINT_LEN];
    let mut i = 0;
    while v >= 0x80 {
        out[i] = (v as u8) | 0x80;
        v >>= 7;
        i += 1;
    }
    out[i] = v as u8;
    (out, i + 1)
}

/// Number of bytes `encode_varint` emits for `v`.
#[inline]
pub const fn encoded_len_varint(v: u64) -> usize {
    let bits = 64 - (v | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Decodes a varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
/// - `Error::TruncatedInput` if `buf` ends while the continuation bit is still set.
/// - `Error::MalformedVarint` if the tenth byte carries more than the final bit of a u64.
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        // The tenth group holds bit 63 only; anything else either overflows or continues.
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(Error::MalformedVarint);
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte < 0x80 {
            return Ok((value, i + 1));
        }
    }
    Err(Error::TruncatedInput { needed: buf.len() + 1, available: buf.len() })
}
