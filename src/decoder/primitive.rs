use bytes::Buf;

use super::{read_buf, Decoder};
use crate::errors::Result;

impl Decoder {
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) if no byte is left.
    pub fn read_int8(&mut self) -> Result<i8> {
        Ok(read_buf!(self, 1, "int8", get_i8))
    }

    /// Big-endian two's-complement 16-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) if fewer than 2 bytes are left.
    pub fn read_int16(&mut self) -> Result<i16> {
        Ok(read_buf!(self, 2, "int16", get_i16))
    }

    /// Big-endian two's-complement 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) if fewer than 4 bytes are left.
    pub fn read_int32(&mut self) -> Result<i32> {
        Ok(read_buf!(self, 4, "int32", get_i32))
    }

    /// Big-endian two's-complement 64-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) if fewer than 8 bytes are left.
    pub fn read_int64(&mut self) -> Result<i64> {
        Ok(read_buf!(self, 8, "int64", get_i64))
    }

    /// Only the byte value `1` is `true`, every other value reads as `false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`](crate::Error::Underrun) if no byte is left.
    pub fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.read_int8()? == 1)
    }
}
