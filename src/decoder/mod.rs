mod collection;
mod payload;
mod primitive;
mod varint;

use bytes::Bytes;
use log::{debug, trace};

pub use self::collection::TaggedField;
pub use self::varint::{decode_zigzag, decode_zigzag64};
use crate::errors::{Error, Result};
use crate::opts::Config;

/// Check the unread length, then decode a fixed-width value with `bytes::Buf`.
/// The cursor only moves when the whole value is available.
macro_rules! read_buf {
    ($decoder:expr, $len:expr, $field:literal, $get:ident) => {{
        $decoder.ensure($len, $field)?;
        let val = $decoder.chunk().$get();
        $decoder.offset += $len;
        val
    }};
}

pub(crate) use read_buf;

/// Pull-based decoder over an immutable byte buffer.
///
/// Every read starts at the current offset and advances it by the number of
/// bytes consumed. The buffer is reference counted, so payloads and
/// sub-decoders are views into the same storage rather than copies.
///
/// A failed read may leave the offset anywhere inside the value being read,
/// the decoder should be dropped afterwards.
#[derive(Debug, Clone)]
pub struct Decoder {
    buffer: Bytes,
    offset: usize,
    config: Config,
}

impl Decoder {
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self::with_config(buffer, Config::default())
    }

    pub fn with_config(buffer: impl Into<Bytes>, config: Config) -> Self {
        Self {
            buffer: buffer.into(),
            offset: 0,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current read offset in bytes. It may exceed [`Decoder::len`] after
    /// [`Decoder::read_all`] or [`Decoder::forward`].
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no unread bytes are left.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn can_read_bytes(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    pub fn can_read_int8(&self) -> bool {
        self.can_read_bytes(1)
    }

    pub fn can_read_int16(&self) -> bool {
        self.can_read_bytes(2)
    }

    pub fn can_read_int32(&self) -> bool {
        self.can_read_bytes(4)
    }

    pub fn can_read_int64(&self) -> bool {
        self.can_read_bytes(8)
    }

    /// Skip `n` bytes without reading them. No bounds check is made, reads
    /// after skipping past the end fail with [`Error::Underrun`].
    pub fn forward(&mut self, n: usize) {
        trace!("[decoder] forward {n} bytes from offset {}", self.offset);
        self.offset = self.offset.saturating_add(n);
    }

    /// Create an independent decoder over the next `size` unread bytes.
    ///
    /// The sub-decoder starts at offset 0 and shares the buffer storage.
    /// This decoder's offset is left untouched, call [`Decoder::forward`] to
    /// skip the sliced region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSliceSize`] if `size` exceeds the unread bytes.
    pub fn slice(&self, size: usize) -> Result<Decoder> {
        let remaining = self.remaining();
        if size > remaining {
            return Err(Error::InvalidSliceSize { size, remaining });
        }
        let start = self.position();
        trace!(
            "[decoder] slice [{start}, {}) of {} bytes",
            start + size,
            self.buffer.len()
        );
        Ok(Decoder {
            buffer: self.buffer.slice(start..start + size),
            offset: 0,
            config: self.config,
        })
    }

    /// Return every unread byte.
    ///
    /// The offset is advanced by the length of the whole buffer rather than
    /// by the number of bytes returned, so after a partial read it ends up
    /// past the end. Wire peers rely on the returned bytes only.
    pub fn read_all(&mut self) -> Bytes {
        let rest = self.buffer.slice(self.position()..);
        self.offset = self.offset.saturating_add(self.buffer.len());
        if self.offset > self.buffer.len() {
            debug!(
                "[decoder] read_all moved offset to {}, past buffer end {}",
                self.offset,
                self.buffer.len()
            );
        }
        rest
    }

    /// The offset clamped to the buffer length.
    fn position(&self) -> usize {
        self.offset.min(self.buffer.len())
    }

    /// Unread bytes, empty once the offset is past the end.
    fn chunk(&self) -> &[u8] {
        self.buffer.get(self.offset..).unwrap_or_default()
    }

    fn ensure(&self, need: usize, field: &'static str) -> Result<()> {
        let have = self.remaining();
        if have < need {
            return Err(Error::Underrun { field, need, have });
        }
        Ok(())
    }

    /// Split off the next `n` bytes as a view into the buffer.
    fn take(&mut self, n: usize, field: &'static str) -> Result<Bytes> {
        self.ensure(n, field)?;
        let start = self.position();
        let bytes = self.buffer.slice(start..start + n);
        self.offset += n;
        Ok(bytes)
    }
}
