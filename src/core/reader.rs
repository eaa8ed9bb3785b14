//! # Packet Reader
//!
//! Cursor over an immutable packet buffer. Construction consumes the leading VarInt
//! packet ID; every `read_*` call then decodes the next field and advances the cursor
//! by exactly the bytes it consumed.
//!
//! ```rust
//! use craft_protocol::core::reader::PacketReader;
//!
//! # fn main() -> craft_protocol::error::Result<()> {
//! let mut reader = PacketReader::new(vec![0x00, 0x03, b'a', b'b', b'c', 0x01])?;
//! assert_eq!(reader.packet_id(), 0);
//! assert_eq!(reader.read_string()?, "abc");
//! assert!(reader.read_bool()?);
//! assert!(!reader.has_remaining());
//! # Ok(())
//! # }
//! ```
//!
//! The buffer is a [`Bytes`] handle, so cloning a reader or taking raw slices from it
//! never copies payload bytes.

use crate::config::{WireConfig, DEFAULT_PROTOCOL_VERSION, MAX_PAYLOAD_SIZE};
use crate::core::position::{Position, PositionLayout};
use crate::core::tag::Tag;
use crate::core::varnum::{decode_var_int, decode_var_long};
use crate::error::{CodecError, Result};
use crate::utils::compression;
use crate::utils::identifier::format_identifier;
use bytes::{Buf, Bytes};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};

/// Length sentinel marking an absent compressed tag
pub(crate) const ABSENT_TAG_LENGTH: i16 = -1;

/// Typed, cursor-based reader over one received packet
#[derive(Debug, Clone)]
pub struct PacketReader {
    buf: Bytes,
    cursor: usize,
    body_start: usize,
    packet_id: i32,
    protocol_version: i32,
    max_decompressed_size: usize,
}

impl PacketReader {
    /// Create a reader bound to [`DEFAULT_PROTOCOL_VERSION`]
    ///
    /// # Errors
    /// Fails if the buffer does not start with a well-formed VarInt packet ID
    pub fn new(buf: impl Into<Bytes>) -> Result<Self> {
        Self::with_version(buf, DEFAULT_PROTOCOL_VERSION)
    }

    /// Create a reader bound to `protocol_version`
    pub fn with_version(buf: impl Into<Bytes>, protocol_version: i32) -> Result<Self> {
        Self::build(buf.into(), protocol_version, MAX_PAYLOAD_SIZE)
    }

    /// Create a reader using the version and limits from `config`
    pub fn with_config(buf: impl Into<Bytes>, config: &WireConfig) -> Result<Self> {
        Self::build(
            buf.into(),
            config.protocol_version,
            config.max_decompressed_size,
        )
    }

    fn build(buf: Bytes, protocol_version: i32, max_decompressed_size: usize) -> Result<Self> {
        let (packet_id, body_start) = decode_var_int(&buf, 0)?;
        trace!(packet_id, protocol_version, len = buf.len(), "Packet reader created");

        Ok(Self {
            buf,
            cursor: body_start,
            body_start,
            packet_id,
            protocol_version,
            max_decompressed_size,
        })
    }

    /// A fresh reader over the same buffer, positioned just past the packet ID
    pub fn restart(&self) -> Self {
        Self {
            buf: self.buf.clone(),
            cursor: self.body_start,
            ..*self
        }
    }

    pub fn packet_id(&self) -> i32 {
        self.packet_id
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    /// Current offset into the buffer
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total buffer length, packet ID included
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Pairs with [`len`](Self::len); always `false` once constructed, since the
    /// buffer holds at least the packet ID
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Borrow the next `n` bytes and advance past them
    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(CodecError::OutOfBounds {
                requested: n,
                remaining,
            });
        }
        let start = self.cursor;
        self.cursor += n;
        Ok(&self.buf[start..self.cursor])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?.get_i8())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?.get_u8())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.take(2)?.get_i16())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.take(2)?.get_u16())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.take(4)?.get_i32())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.take(4)?.get_u32())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.take(8)?.get_i64())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(self.take(8)?.get_u64())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.take(4)?.get_f32())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(self.take(8)?.get_f64())
    }

    /// Read one byte; any non-zero value is `true`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read exactly `n` raw bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(CodecError::OutOfBounds {
                requested: n,
                remaining,
            });
        }
        let slice = self.buf.slice(self.cursor..self.cursor + n);
        self.cursor += n;
        Ok(slice)
    }

    /// Read everything after the cursor
    pub fn read_remaining(&mut self) -> Bytes {
        let slice = self.buf.slice(self.cursor..);
        self.cursor = self.buf.len();
        slice
    }

    pub fn read_var_int(&mut self) -> Result<i32> {
        let (value, next) = decode_var_int(&self.buf, self.cursor)?;
        self.cursor = next;
        Ok(value)
    }

    pub fn read_var_long(&mut self) -> Result<i64> {
        let (value, next) = decode_var_long(&self.buf, self.cursor)?;
        self.cursor = next;
        Ok(value)
    }

    /// Read a VarInt length prefix, rejecting negatives
    fn read_length(&mut self) -> Result<usize> {
        let len = self.read_var_int()?;
        usize::try_from(len).map_err(|_| CodecError::InvalidLength(i64::from(len)))
    }

    /// Read a VarInt-length-prefixed byte array
    pub fn read_byte_array(&mut self) -> Result<Bytes> {
        let len = self.read_length()?;
        self.read_bytes(len)
    }

    /// Read a VarInt-length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_length()?;
        let bytes = self.take(len)?.to_vec();
        Ok(String::from_utf8(bytes)?)
    }

    /// Read a string and parse it as JSON
    pub fn read_json(&mut self) -> Result<serde_json::Value> {
        self.read_json_as()
    }

    /// Read a string and deserialize it as JSON into `T`
    pub fn read_json_as<T: DeserializeOwned>(&mut self) -> Result<T> {
        let text = self.read_string()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read a presence flag, then the value if present
    pub fn read_optional<T, F>(&mut self, read: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.read_bool()? {
            read(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a VarInt count, then that many elements
    ///
    /// A count larger than the bytes remaining is rejected before any element is read.
    pub fn read_array<T, F>(&mut self, mut read: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let count = self.read_length()?;
        let remaining = self.remaining();
        if count > remaining {
            return Err(CodecError::ArrayTooLong { count, remaining });
        }

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Read 16 raw bytes and format them as a hyphenated UUID
    pub fn read_uuid(&mut self) -> Result<String> {
        let mut raw = [0u8; 16];
        self.take(16)?.copy_to_slice(&mut raw);
        Ok(format_identifier(raw))
    }

    /// Read a packed block position using this reader's protocol layout
    pub fn read_position(&mut self) -> Result<Position> {
        let word = self.read_u64()?;
        Ok(Position::unpack(
            word,
            PositionLayout::for_version(self.protocol_version),
        ))
    }

    /// Read an inline tag, advancing by the length the tag codec reports
    pub fn read_tag<T: Tag>(&mut self) -> Result<T> {
        let remaining = self.remaining();
        let (tag, consumed) = T::read_tag(&self.buf[self.cursor..])?;
        if consumed > remaining {
            return Err(CodecError::OutOfBounds {
                requested: consumed,
                remaining,
            });
        }
        self.cursor += consumed;
        Ok(tag)
    }

    /// Read the i16 length of a compressed tag and its gzip bytes
    ///
    /// Returns `None` for the absent-tag sentinel, leaving the cursor just past it.
    fn read_compressed_frame(&mut self) -> Result<Option<Bytes>> {
        let len = self.read_i16()?;
        if len == ABSENT_TAG_LENGTH {
            return Ok(None);
        }
        let len = usize::try_from(len).map_err(|_| CodecError::InvalidLength(i64::from(len)))?;
        self.read_bytes(len).map(Some)
    }

    /// Read an i16-length-prefixed gzip tag
    ///
    /// # Errors
    /// Returns `CodecError::DecompressionFailure` if the bytes are not valid gzip
    #[instrument(skip(self), level = "trace", fields(packet_id = self.packet_id))]
    pub fn read_compressed_tag<T: Tag>(&mut self) -> Result<Option<T>> {
        let Some(compressed) = self.read_compressed_frame()? else {
            debug!("Compressed tag absent");
            return Ok(None);
        };

        let raw = compression::decompress_with_limit(&compressed, self.max_decompressed_size)
            .inspect_err(|_| warn!(len = compressed.len(), "Compressed tag failed to inflate"))?;
        debug!(compressed = compressed.len(), inflated = raw.len(), "Compressed tag read");
        T::parse_tag(&raw).map(Some)
    }

    /// Async variant of [`read_compressed_tag`](Self::read_compressed_tag) that inflates
    /// on tokio's blocking pool
    #[instrument(skip(self), level = "trace", fields(packet_id = self.packet_id))]
    pub async fn read_compressed_tag_async<T: Tag>(&mut self) -> Result<Option<T>> {
        let Some(compressed) = self.read_compressed_frame()? else {
            debug!("Compressed tag absent");
            return Ok(None);
        };

        let len = compressed.len();
        let raw = compression::decompress_async(compressed, self.max_decompressed_size)
            .await
            .inspect_err(|_| warn!(len, "Compressed tag failed to inflate"))?;
        debug!(compressed = len, inflated = raw.len(), "Compressed tag read");
        T::parse_tag(&raw).map(Some)
    }
}
