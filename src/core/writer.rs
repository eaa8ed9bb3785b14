//! # Packet Writer
//!
//! Growable buffer plus write cursor. Construction writes the VarInt packet ID; each
//! `write_*` call appends one field and returns the writer so calls can be chained.
//!
//! ```rust
//! use craft_protocol::core::position::Position;
//! use craft_protocol::core::writer::PacketWriter;
//!
//! # fn main() -> craft_protocol::error::Result<()> {
//! let mut writer = PacketWriter::with_version(0x0B, 763);
//! writer
//!     .write_string("spawn")?
//!     .write_position(Position::new(8, 64, -8))
//!     .write_bool(true);
//! let packet = writer.finish();
//! assert_eq!(packet[0], 0x0B);
//! # Ok(())
//! # }
//! ```
//!
//! ## Buffer Growth
//! The buffer starts at a small fixed capacity and doubles whenever a write would
//! overflow it, so a packet of `n` bytes costs `O(log n)` reallocations. Growth always
//! happens before the bytes are copied in; the cursor never passes the capacity.
//!
//! ## Fallibility
//! Fixed-width, VarNum, position, and raw-byte writes cannot fail. Writes carrying a
//! VarInt length prefix fail with `OversizedPayload` if the length does not fit an
//! `i32`; identifier, JSON, tag, and compression writes surface their collaborator's
//! error.

use crate::config::{WireConfig, DEFAULT_PROTOCOL_VERSION, WRITER_INITIAL_CAPACITY};
use crate::core::position::{Position, PositionLayout};
use crate::core::reader::ABSENT_TAG_LENGTH;
use crate::core::tag::Tag;
use crate::core::varnum::{encode_var_int, encode_var_long};
use crate::error::{CodecError, Result};
use crate::utils::compression;
use crate::utils::identifier::parse_identifier;
use bytes::Bytes;
use serde::Serialize;
use std::ops::Range;
use tracing::{debug, instrument, trace};

/// Typed, chainable writer for one outgoing packet
#[derive(Debug, Clone)]
pub struct PacketWriter {
    // Physical storage; `buf.len()` is the capacity and `cursor` the logical length
    buf: Vec<u8>,
    cursor: usize,
    packet_id: i32,
    protocol_version: i32,
}

impl PacketWriter {
    /// Create a writer bound to [`DEFAULT_PROTOCOL_VERSION`]
    pub fn new(packet_id: i32) -> Self {
        Self::with_version(packet_id, DEFAULT_PROTOCOL_VERSION)
    }

    /// Create a writer bound to `protocol_version`
    pub fn with_version(packet_id: i32, protocol_version: i32) -> Self {
        Self::with_capacity(packet_id, protocol_version, WRITER_INITIAL_CAPACITY)
    }

    /// Create a writer using the version and initial capacity from `config`
    pub fn with_config(packet_id: i32, config: &WireConfig) -> Self {
        Self::with_capacity(
            packet_id,
            config.protocol_version,
            config.writer_initial_capacity,
        )
    }

    /// Create a writer whose buffer starts at `capacity` bytes
    pub fn with_capacity(packet_id: i32, protocol_version: i32, capacity: usize) -> Self {
        let mut writer = Self {
            buf: vec![0; capacity],
            cursor: 0,
            packet_id,
            protocol_version,
        };
        writer.write_var_int(packet_id);
        trace!(packet_id, protocol_version, capacity, "Packet writer created");
        writer
    }

    pub fn packet_id(&self) -> i32 {
        self.packet_id
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    /// Number of bytes written so far, packet ID included
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current physical buffer size
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.cursor]
    }

    /// Consume the writer, keeping exactly the written bytes
    pub fn finish(self) -> Bytes {
        let mut buf = self.buf;
        buf.truncate(self.cursor);
        Bytes::from(buf)
    }

    /// Double the capacity until `width` more bytes fit after the cursor
    fn reserve(&mut self, width: usize) {
        let needed = self.cursor + width;
        if needed <= self.buf.len() {
            return;
        }

        let mut capacity = self.buf.len().max(1);
        while capacity < needed {
            capacity *= 2;
        }
        trace!(from = self.buf.len(), to = capacity, "Growing writer buffer");
        self.buf.resize(capacity, 0);
    }

    fn put(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buf[self.cursor..self.cursor + bytes.len()].copy_from_slice(bytes);
        self.cursor += bytes.len();
    }

    fn put_u8(&mut self, byte: u8) {
        self.reserve(1);
        self.buf[self.cursor] = byte;
        self.cursor += 1;
    }

    /// Write a VarInt length prefix
    fn put_length(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| CodecError::OversizedPayload(len))?;
        self.write_var_int(len);
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> &mut Self {
        self.put_u8(value as u8);
        self
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.put_u8(value);
        self
    }

    pub fn write_i16(&mut self, value: i16) -> &mut Self {
        self.put(&value.to_be_bytes());
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.put(&value.to_be_bytes());
        self
    }

    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.put(&value.to_be_bytes());
        self
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.put(&value.to_be_bytes());
        self
    }

    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.put(&value.to_be_bytes());
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.put(&value.to_be_bytes());
        self
    }

    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.put(&value.to_be_bytes());
        self
    }

    pub fn write_f64(&mut self, value: f64) -> &mut Self {
        self.put(&value.to_be_bytes());
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.put_u8(u8::from(value));
        self
    }

    /// Append raw bytes with no length prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put(bytes);
        self
    }

    /// Replace the buffer with `range` of the bytes written so far
    ///
    /// The cursor moves to the end of the kept range. Fails without modifying the
    /// writer if `range` is inverted or reaches past the cursor.
    pub fn splice(&mut self, range: Range<usize>) -> Result<&mut Self> {
        if range.start > range.end || range.end > self.cursor {
            return Err(CodecError::OutOfBounds {
                requested: range.end.max(range.start),
                remaining: self.cursor,
            });
        }

        let len = range.len();
        self.buf.copy_within(range, 0);
        self.buf.truncate(len);
        self.cursor = len;
        Ok(self)
    }

    pub fn write_var_int(&mut self, value: i32) -> &mut Self {
        encode_var_int(value, |byte| self.put_u8(byte));
        self
    }

    pub fn write_var_long(&mut self, value: i64) -> &mut Self {
        encode_var_long(value, |byte| self.put_u8(byte));
        self
    }

    /// Write a VarInt length followed by the raw bytes
    pub fn write_byte_array(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.put_length(bytes.len())?;
        self.put(bytes);
        Ok(self)
    }

    /// Write a VarInt byte length followed by the UTF-8 bytes
    pub fn write_string(&mut self, value: &str) -> Result<&mut Self> {
        self.write_byte_array(value.as_bytes())
    }

    /// Serialize `value` to JSON text and write it as a string
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let text = serde_json::to_string(value)?;
        self.write_string(&text)
    }

    /// Write a presence flag, then the value if present
    pub fn write_optional<T, F>(&mut self, value: Option<&T>, write: F) -> Result<&mut Self>
    where
        F: for<'w> FnOnce(&'w mut Self, &T) -> Result<&'w mut Self>,
    {
        match value {
            Some(inner) => {
                self.write_bool(true);
                write(self, inner)
            }
            None => Ok(self.write_bool(false)),
        }
    }

    /// Write a VarInt element count, then each element in order
    pub fn write_array<T, F>(&mut self, items: &[T], mut write: F) -> Result<&mut Self>
    where
        F: for<'w> FnMut(&'w mut Self, &T) -> Result<&'w mut Self>,
    {
        self.put_length(items.len())?;
        for item in items {
            write(self, item)?;
        }
        Ok(self)
    }

    /// Parse a hyphenated UUID and write its 16 raw bytes
    pub fn write_uuid(&mut self, text: &str) -> Result<&mut Self> {
        let raw = parse_identifier(text)?;
        self.put(&raw);
        Ok(self)
    }

    /// Pack `position` using this writer's protocol layout
    ///
    /// Components outside their field range are truncated, not rejected.
    pub fn write_position(&mut self, position: Position) -> &mut Self {
        let layout = PositionLayout::for_version(self.protocol_version);
        self.write_u64(position.pack(layout))
    }

    pub fn write_position_xyz(&mut self, x: i32, y: i32, z: i32) -> &mut Self {
        self.write_position(Position::new(x, y, z))
    }

    /// Append the tag codec's encoding of `tag`
    pub fn write_tag<T: Tag>(&mut self, tag: &T) -> Result<&mut Self> {
        let raw = tag.write_tag()?;
        self.put(&raw);
        Ok(self)
    }

    /// Write the i16 length and normalized gzip bytes of a compressed tag
    fn put_compressed_frame(&mut self, mut compressed: Vec<u8>) -> Result<&mut Self> {
        compression::normalize_header(&mut compressed);
        let len = i16::try_from(compressed.len())
            .map_err(|_| CodecError::OversizedPayload(compressed.len()))?;
        debug!(compressed = compressed.len(), "Compressed tag written");
        self.write_i16(len);
        self.put(&compressed);
        Ok(self)
    }

    /// Write `tag` gzip-compressed behind an i16 length, or the -1 sentinel for `None`
    #[instrument(skip(self, tag), level = "trace", fields(packet_id = self.packet_id))]
    pub fn write_compressed_tag<T: Tag>(&mut self, tag: Option<&T>) -> Result<&mut Self> {
        let Some(tag) = tag else {
            return Ok(self.write_i16(ABSENT_TAG_LENGTH));
        };

        let raw = tag.write_tag()?;
        let compressed = compression::compress(&raw)?;
        self.put_compressed_frame(compressed)
    }

    /// Async variant of [`write_compressed_tag`](Self::write_compressed_tag) that
    /// compresses on tokio's blocking pool
    #[instrument(skip(self, tag), level = "trace", fields(packet_id = self.packet_id))]
    pub async fn write_compressed_tag_async<T: Tag>(
        &mut self,
        tag: Option<&T>,
    ) -> Result<&mut Self> {
        let Some(tag) = tag else {
            return Ok(self.write_i16(ABSENT_TAG_LENGTH));
        };

        let raw = tag.write_tag()?;
        let compressed = compression::compress_async(raw).await?;
        self.put_compressed_frame(compressed)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::core::reader::PacketReader;
    use crate::core::tag::test_support::TextTag;

    #[test]
    fn test_packet_id_written_first() {
        let writer = PacketWriter::new(300);
        assert_eq!(writer.as_bytes(), &[0xAC, 0x02]);
        assert_eq!(writer.cursor(), 2);
        assert_eq!(writer.capacity(), WRITER_INITIAL_CAPACITY);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut writer = PacketWriter::new(0);
        writer.write_u16(1).write_i32(-2).write_bool(true);
        assert_eq!(
            writer.as_bytes(),
            &[0x00, 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFE, 0x01]
        );
    }

    #[test]
    fn test_growth_doubles_and_preserves_bytes() {
        let mut writer = PacketWriter::with_capacity(1, DEFAULT_PROTOCOL_VERSION, 4);
        for i in 0..20u8 {
            writer.write_u8(i);
        }
        assert_eq!(writer.capacity(), 32);
        assert_eq!(writer.cursor(), 21);

        let packet = writer.finish();
        assert_eq!(packet.len(), 21);
        assert_eq!(packet[0], 1);
        assert_eq!(&packet[1..], (0..20u8).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_large_write_grows_in_one_step() {
        let mut writer = PacketWriter::with_capacity(0, DEFAULT_PROTOCOL_VERSION, 2);
        writer.write_bytes(&[7u8; 100]);
        assert_eq!(writer.capacity(), 128);
        assert_eq!(writer.cursor(), 101);
    }

    #[test]
    fn test_zero_capacity_still_grows() {
        let mut writer = PacketWriter::with_capacity(5, DEFAULT_PROTOCOL_VERSION, 0);
        writer.write_u32(0xDEAD_BEEF);
        assert_eq!(writer.as_bytes(), &[0x05, 0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(writer.capacity() >= writer.cursor());
    }

    #[test]
    fn test_string_is_length_prefixed() {
        let mut writer = PacketWriter::new(0);
        writer.write_string("héllo").unwrap();
        // "héllo" is 6 bytes of UTF-8
        assert_eq!(writer.as_bytes()[1], 6);
        assert_eq!(&writer.as_bytes()[2..], "héllo".as_bytes());
    }

    #[test]
    fn test_optional_absent_writes_single_false_byte() {
        let mut writer = PacketWriter::new(0);
        writer
            .write_optional(None::<&u32>, |w, v| Ok(w.write_u32(*v)))
            .unwrap();
        assert_eq!(writer.as_bytes(), &[0x00, 0x00]);
    }

    #[test]
    fn test_optional_present() {
        let mut writer = PacketWriter::new(0);
        writer
            .write_optional(Some(&"hi"), |w, s| w.write_string(s))
            .unwrap();
        assert_eq!(writer.as_bytes(), &[0x00, 0x01, 0x02, b'h', b'i']);
    }

    #[test]
    fn test_array_count_then_elements() {
        let mut writer = PacketWriter::new(0);
        writer
            .write_array(&[10i16, 20, 30], |w, v| Ok(w.write_i16(*v)))
            .unwrap();
        assert_eq!(
            writer.as_bytes(),
            &[0x00, 0x03, 0x00, 0x0A, 0x00, 0x14, 0x00, 0x1E]
        );
    }

    #[test]
    fn test_array_element_error_propagates() {
        let mut writer = PacketWriter::new(0);
        let ids = ["069a79f4-44e9-4726-a5be-fca90e38aaf5", "not-a-uuid"];
        let result = writer.write_array(&ids, |w, id| w.write_uuid(id));
        assert!(matches!(result, Err(CodecError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_splice_keeps_sub_range() {
        let mut writer = PacketWriter::new(0);
        writer.write_bytes(&[1, 2, 3, 4]);
        writer.splice(1..4).unwrap();
        assert_eq!(writer.as_bytes(), &[1, 2, 3]);
        assert_eq!(writer.cursor(), 3);

        writer.write_u8(9);
        assert_eq!(writer.as_bytes(), &[1, 2, 3, 9]);
    }

    #[test]
    fn test_splice_past_cursor_rejected() {
        let mut writer = PacketWriter::new(0);
        writer.write_u8(1);
        assert!(matches!(
            writer.splice(0..10),
            Err(CodecError::OutOfBounds { .. })
        ));
        assert_eq!(writer.as_bytes(), &[0x00, 0x01]);
    }

    #[test]
    fn test_empty_splice_then_write() {
        let mut writer = PacketWriter::new(0);
        writer.splice(0..0).unwrap();
        assert_eq!(writer.capacity(), 0);
        writer.write_u16(0x0102);
        assert_eq!(writer.as_bytes(), &[0x01, 0x02]);
    }

    #[test]
    fn test_position_forms_agree() {
        let mut a = PacketWriter::with_version(0, 477);
        a.write_position(Position::new(-5, 70, 12));
        let mut b = PacketWriter::with_version(0, 477);
        b.write_position_xyz(-5, 70, 12);
        assert_eq!(a.as_bytes(), b.as_bytes());

        let mut reader = PacketReader::with_version(a.finish(), 477).unwrap();
        assert_eq!(reader.read_position().unwrap(), Position::new(-5, 70, 12));
    }

    #[test]
    fn test_json_write() {
        let mut writer = PacketWriter::new(0);
        writer
            .write_json(&serde_json::json!({ "text": "hello" }))
            .unwrap();
        let mut reader = PacketReader::new(writer.finish()).unwrap();
        assert_eq!(reader.read_json().unwrap()["text"], "hello");
    }

    #[test]
    fn test_compressed_tag_absent_sentinel() {
        let mut writer = PacketWriter::new(0);
        writer.write_compressed_tag::<TextTag>(None).unwrap();
        assert_eq!(writer.as_bytes(), &[0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_compressed_tag_header_normalized() {
        let mut writer = PacketWriter::new(0);
        writer
            .write_compressed_tag(Some(&TextTag("level".to_string())))
            .unwrap();
        let bytes = writer.as_bytes();
        let len = i16::from_be_bytes([bytes[1], bytes[2]]) as usize;
        assert_eq!(bytes.len(), 3 + len);
        assert_eq!(&bytes[3..5], &[0x1F, 0x8B]);
        assert_eq!(bytes[3 + compression::GZIP_OS_BYTE_OFFSET], 0);
    }

    #[test]
    fn test_inline_tag_roundtrip() {
        let mut writer = PacketWriter::new(0);
        writer
            .write_tag(&TextTag("inline".to_string()))
            .unwrap()
            .write_u8(0xAB);
        let mut reader = PacketReader::new(writer.finish()).unwrap();
        let tag: TextTag = reader.read_tag().unwrap();
        assert_eq!(tag.0, "inline");
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
    }
}
