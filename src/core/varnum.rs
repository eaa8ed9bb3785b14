//! # VarNum Encoding
//!
//! Variable-length integers: each byte carries the low 7 bits of the remaining value,
//! least-significant group first, with bit 7 set when more bytes follow.
//!
//! ```text
//! 0       -> [0x00]
//! 300     -> [0xAC, 0x02]
//! -1_i32  -> [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
//! ```
//!
//! Negative values are encoded through their unsigned two's-complement bit pattern,
//! so a negative VarInt always takes the full 5 bytes and a negative VarLong 10.

use crate::error::{CodecError, Result};

/// Maximum encoded width of a 32-bit VarInt
pub const MAX_VAR_INT_BYTES: usize = 5;

/// Maximum encoded width of a 64-bit VarLong
pub const MAX_VAR_LONG_BYTES: usize = 10;

const SEGMENT_BITS: u64 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// Emit the VarInt encoding of `value` one byte at a time
#[inline]
pub fn encode_var_int(value: i32, emit: impl FnMut(u8)) {
    encode_unsigned(u64::from(value as u32), emit);
}

/// Emit the VarLong encoding of `value` one byte at a time
#[inline]
pub fn encode_var_long(value: i64, emit: impl FnMut(u8)) {
    encode_unsigned(value as u64, emit);
}

fn encode_unsigned(mut value: u64, mut emit: impl FnMut(u8)) {
    loop {
        let mut byte = (value & SEGMENT_BITS) as u8;
        value >>= 7;
        if value != 0 {
            byte |= CONTINUE_BIT;
        }
        emit(byte);
        if value == 0 {
            break;
        }
    }
}

/// Number of bytes the VarInt encoding of `value` occupies
pub fn var_int_size(value: i32) -> usize {
    unsigned_size(u64::from(value as u32))
}

/// Number of bytes the VarLong encoding of `value` occupies
pub fn var_long_size(value: i64) -> usize {
    unsigned_size(value as u64)
}

fn unsigned_size(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Decode a VarInt starting at `offset`, returning the value and the offset just past it
///
/// # Errors
/// - `CodecError::OutOfBounds` if the buffer ends before the terminating byte
/// - `CodecError::MalformedVarNum` if more than 5 bytes carry the continuation bit
pub fn decode_var_int(buf: &[u8], offset: usize) -> Result<(i32, usize)> {
    let (value, next) = decode_unsigned(buf, offset, MAX_VAR_INT_BYTES)?;
    Ok((value as u32 as i32, next))
}

/// Decode a VarLong starting at `offset`, returning the value and the offset just past it
///
/// # Errors
/// - `CodecError::OutOfBounds` if the buffer ends before the terminating byte
/// - `CodecError::MalformedVarNum` if more than 10 bytes carry the continuation bit
pub fn decode_var_long(buf: &[u8], offset: usize) -> Result<(i64, usize)> {
    let (value, next) = decode_unsigned(buf, offset, MAX_VAR_LONG_BYTES)?;
    Ok((value as i64, next))
}

fn decode_unsigned(buf: &[u8], offset: usize, max_bytes: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut cursor = offset;

    for group in 0..max_bytes {
        let byte = *buf.get(cursor).ok_or(CodecError::OutOfBounds {
            requested: 1,
            remaining: 0,
        })?;
        cursor += 1;

        value |= (u64::from(byte) & SEGMENT_BITS) << (7 * group);
        if byte & CONTINUE_BIT == 0 {
            return Ok((value, cursor));
        }
    }

    Err(CodecError::MalformedVarNum { max_bytes })
}
