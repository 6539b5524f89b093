//! Variable-length integer coding.
//!
//! Avro lengths, counts, union branches, enum indices, ints and longs are all
//! written as little-endian base-128 varints. Signed values are zigzag mapped
//! first so that small magnitudes of either sign stay short:
//! `0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...`

use crate::error::DecodeError;

/// Longest legal encoding of a 64-bit varint.
const MAX_VARINT_LEN: usize = 10;

/// Decode an unsigned varint, advancing the cursor past it.
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input ends mid-varint
/// - `DecodeError::InvalidVarint` if more than ten bytes carry the continuation bit
#[inline]
pub fn decode_varint(data: &mut &[u8]) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;

    for i in 0..MAX_VARINT_LEN {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *data = rest;

        result |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }

    Err(DecodeError::InvalidVarint)
}

/// Decode a zigzag-encoded signed varint.
#[inline]
pub fn decode_zigzag(data: &mut &[u8]) -> Result<i64, DecodeError> {
    let unsigned = decode_varint(data)?;
    Ok(((unsigned >> 1) as i64) ^ -((unsigned & 1) as i64))
}

/// Advance past a varint without computing its value.
#[inline]
pub fn skip_varint(data: &mut &[u8]) -> Result<(), DecodeError> {
    for _ in 0..MAX_VARINT_LEN {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *data = rest;
        if byte & 0x80 == 0 {
            return Ok(());
        }
    }
    Err(DecodeError::InvalidVarint)
}

/// Encode an unsigned value as a varint.
///
/// The crate only decodes; this and [`encode_zigzag`] exist so tests and
/// benchmarks can build inputs.
#[inline]
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Encode a signed value as a zigzag varint.
#[inline]
pub fn encode_zigzag(value: i64) -> Vec<u8> {
    encode_varint(((value << 1) ^ (value >> 63)) as u64)
}
