use std::borrow::Cow;

use bytes::Bytes;
use log::debug;

use super::Decoder;
use crate::errors::{Error, Result};
use crate::opts::TextPolicy;

/// Length prefix reserved for absent strings and byte payloads
const NULL_LENGTH: i64 = -1;

/// Interpret a decoded length prefix, `None` for the null sentinel.
pub(super) fn payload_len(length: i64, field: &'static str) -> Result<Option<usize>> {
    if length == NULL_LENGTH {
        return Ok(None);
    }
    usize::try_from(length)
        .map(Some)
        .map_err(|_| Error::InvalidLength { field, length })
}

impl Decoder {
    /// Read a string with a 16 bits length prefix, `-1` decodes to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`] on a short buffer, [`Error::InvalidLength`]
    /// on a negative prefix other than `-1`, and [`Error::MalformedText`] when
    /// the text is not UTF-8 under [`TextPolicy::Strict`].
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let length = self.read_int16()?;
        self.read_text(i64::from(length), "string")
    }

    /// Same as [`Decoder::read_string`] with a zigzag varint length prefix.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_string`].
    pub fn read_var_int_string(&mut self) -> Result<Option<String>> {
        let length = self.read_var_int()?;
        self.read_text(i64::from(length), "varint string")
    }

    /// Read a compact string: the prefix is an unsigned varint holding the
    /// length plus one, `0` decodes to `None`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_string`].
    pub fn read_compact_string(&mut self) -> Result<Option<String>> {
        let length = self.read_unsigned_var_int()?;
        self.read_text(i64::from(length) - 1, "compact string")
    }

    /// Read a byte payload with a 32 bits length prefix, `-1` decodes to `None`.
    /// The returned bytes share the decoder's storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`] on a short buffer and
    /// [`Error::InvalidLength`] on a negative prefix other than `-1`.
    pub fn read_bytes(&mut self) -> Result<Option<Bytes>> {
        let length = self.read_int32()?;
        self.read_payload(i64::from(length), "bytes")
    }

    /// Read exactly `length` bytes, no length prefix is read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSliceSize`] if `length` exceeds the unread bytes.
    pub fn read_bytes_exact(&mut self, length: usize) -> Result<Bytes> {
        let remaining = self.remaining();
        if length > remaining {
            return Err(Error::InvalidSliceSize {
                size: length,
                remaining,
            });
        }
        self.take(length, "bytes")
    }

    /// Same as [`Decoder::read_bytes`] with a zigzag varint length prefix.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_bytes`].
    pub fn read_var_int_bytes(&mut self) -> Result<Option<Bytes>> {
        let length = self.read_var_int()?;
        self.read_payload(i64::from(length), "varint bytes")
    }

    /// Read compact bytes, the prefix is an unsigned varint holding the
    /// length plus one, `0` decodes to `None`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_bytes`].
    pub fn read_compact_bytes(&mut self) -> Result<Option<Bytes>> {
        let length = self.read_unsigned_var_int()?;
        self.read_payload(i64::from(length) - 1, "compact bytes")
    }

    fn read_payload(&mut self, length: i64, field: &'static str) -> Result<Option<Bytes>> {
        let Some(length) = payload_len(length, field)? else {
            debug!("[decoder] null {field} at offset {}", self.offset);
            return Ok(None);
        };
        self.take(length, field).map(Some)
    }

    fn read_text(&mut self, length: i64, field: &'static str) -> Result<Option<String>> {
        let Some(bytes) = self.read_payload(length, field)? else {
            return Ok(None);
        };
        let text = match self.config.text {
            TextPolicy::Strict => std::str::from_utf8(&bytes)?.to_owned(),
            TextPolicy::Lossy => match String::from_utf8_lossy(&bytes) {
                Cow::Borrowed(text) => text.to_owned(),
                Cow::Owned(text) => {
                    debug!("[decoder] replaced malformed utf-8 in {field}");
                    text
                }
            },
        };
        Ok(Some(text))
    }
}
