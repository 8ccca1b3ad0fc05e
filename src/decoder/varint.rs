use bytes::Buf;

use super::{read_buf, Decoder};
use crate::errors::Result;

/// Payload bits of a varint byte
const REST: u8 = 0x7f;
/// Set on every varint byte except the last one
const MORE: u8 = 0x80;

/// Recover a signed value from its zigzag mapping, the inverse of
/// `(n << 1) ^ (n >> 31)`.
#[inline]
pub fn decode_zigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// 64 bits version of [`decode_zigzag`], the inverse of `(n << 1) ^ (n >> 63)`.
#[inline]
pub fn decode_zigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

impl Decoder {
    /// Whether a complete varint (or varlong) is available, that is whether
    /// some unread byte has its continuation bit clear.
    pub fn can_read_var_int(&self) -> bool {
        self.chunk().iter().any(|b| b & MORE == 0)
    }

    /// Read an unsigned varint.
    ///
    /// Each byte carries 7 payload bits, least significant chunk first. The
    /// accumulation wraps at 32 bits, shifts past 31 bits wrap modulo 32 like
    /// fixed-width integer arithmetic does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) if the buffer ends
    /// before the last byte.
    pub fn read_unsigned_var_int(&mut self) -> Result<u32> {
        let mut result = 0u32;
        let mut shift = 0u32;
        loop {
            let byte = read_buf!(self, 1, "varint", get_u8);
            result = result.wrapping_add(u32::from(byte & REST).wrapping_shl(shift));
            if byte & MORE == 0 {
                return Ok(result);
            }
            shift = shift.wrapping_add(7);
        }
    }

    /// Read a zigzag encoded varint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) if the buffer ends
    /// before the last byte.
    pub fn read_var_int(&mut self) -> Result<i32> {
        self.read_unsigned_var_int().map(decode_zigzag)
    }

    /// Read a zigzag encoded varlong, accumulated with 64 bits wrapping
    /// arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) if the buffer ends
    /// before the last byte.
    pub fn read_var_long(&mut self) -> Result<i64> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = read_buf!(self, 1, "varlong", get_u8);
            result = result.wrapping_add(u64::from(byte & REST).wrapping_shl(shift));
            if byte & MORE == 0 {
                return Ok(decode_zigzag64(result));
            }
            shift = shift.wrapping_add(7);
        }
    }
}
