//! # Tag Codec Seam
//!
//! Tags are tree-structured, self-describing binary values whose format this crate
//! does not own. Any type implementing [`Tag`] can be read and written by
//! [`PacketReader`](crate::core::reader::PacketReader) and
//! [`PacketWriter`](crate::core::writer::PacketWriter), either inline or wrapped in
//! the gzip framing used for compressed tags.

use crate::error::Result;

/// A value in an external tag format
pub trait Tag: Sized {
    /// Decode a tag from the front of `buf`, returning it with the number of bytes it spans
    fn read_tag(buf: &[u8]) -> Result<(Self, usize)>;

    /// Encode this tag to bytes
    fn write_tag(&self) -> Result<Vec<u8>>;

    /// Decode a tag that occupies a whole (already decompressed) buffer
    fn parse_tag(buf: &[u8]) -> Result<Self> {
        Self::read_tag(buf).map(|(tag, _)| tag)
    }
}
