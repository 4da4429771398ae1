//! Variable-length integer coding.
//!
//! Avro writes integers as little-endian groups of 7 data bits, the high bit
//! of each byte flagging that more bytes follow. Signed values go through
//! zig-zag first so that small negative numbers stay short:
//! `0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...`.
//!
//! `int` values (and the scale prefix of a bytes-backed decimal) use the
//! 32-bit mapping `(n << 1) ^ (n >> 31)`; `long` values use the 64-bit one.

use crate::error::DecodeError;

/// Longest legal encoding of a 32-bit value.
const MAX_INT_BYTES: usize = 5;

/// Decode an unsigned variable-length integer.
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input is truncated
/// - `DecodeError::InvalidVarint` if the varint exceeds 10 bytes
#[inline]
pub fn decode_varint(data: &mut &[u8]) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *data = rest;

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;
        if shift >= 64 {
            return Err(DecodeError::InvalidVarint);
        }
    }
}

/// Decode a zig-zag encoded `long`.
#[inline]
pub fn decode_zigzag(data: &mut &[u8]) -> Result<i64, DecodeError> {
    let unsigned = decode_varint(data)?;
    Ok(((unsigned >> 1) as i64) ^ (-((unsigned & 1) as i64)))
}

/// Decode a zig-zag encoded `int`.
///
/// Encodings longer than five bytes are rejected as `InvalidVarint`.
#[inline]
pub fn decode_zigzag_int(data: &mut &[u8]) -> Result<i32, DecodeError> {
    let mut result: u32 = 0;
    let mut shift: u32 = 0;

    for _ in 0..MAX_INT_BYTES {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *data = rest;

        result |= ((byte & 0x7F) as u32).wrapping_shl(shift);
        if byte & 0x80 == 0 {
            return Ok(((result >> 1) as i32) ^ (-((result & 1) as i32)));
        }
        shift += 7;
    }
    Err(DecodeError::InvalidVarint)
}

/// Skip over a varint without decoding its value.
#[inline]
pub fn skip_varint(data: &mut &[u8]) -> Result<(), DecodeError> {
    loop {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *data = rest;
        if byte & 0x80 == 0 {
            return Ok(());
        }
    }
}

/// Append an unsigned varint to `out`.
#[inline]
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Append a zig-zag encoded `long` to `out`.
#[inline]
pub fn write_zigzag(out: &mut Vec<u8>, value: i64) {
    write_varint(out, ((value << 1) ^ (value >> 63)) as u64);
}

/// Append a zig-zag encoded `int` to `out`.
#[inline]
pub fn write_zigzag_int(out: &mut Vec<u8>, value: i32) {
    write_varint(out, ((value << 1) ^ (value >> 31)) as u32 as u64);
}

/// Encode an unsigned integer as a variable-length integer.
#[inline]
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut result = Vec::with_capacity(2);
    write_varint(&mut result, value);
    result
}

/// Encode a signed `long` as a zig-zag varint.
#[inline]
pub fn encode_zigzag(value: i64) -> Vec<u8> {
    let mut result = Vec::with_capacity(2);
    write_zigzag(&mut result, value);
    result
}
