//! # craft-protocol
//!
//! Bidirectional binary codec for the versioned, VarInt-framed game client/server
//! packet format.
//!
//! A [`PacketReader`] wraps a received buffer and decodes typed fields one at a time;
//! a [`PacketWriter`] appends typed fields to a growable buffer and hands back the
//! finished bytes. Both are bound to a protocol version, which selects the bit layout
//! used for block positions.
//!
//! ## Modules
//! - [`core`]: VarNum encoding, position packing, the tag seam, reader and writer
//! - [`utils`]: gzip, identifier text, and logging collaborators
//! - [`config`]: wire constants and loadable configuration
//! - [`error`]: [`CodecError`] and the crate [`Result`] alias
//!
//! ## Example
//! ```rust
//! use craft_protocol::{PacketReader, PacketWriter, Position};
//!
//! # fn main() -> craft_protocol::Result<()> {
//! let mut writer = PacketWriter::with_version(0x25, 763);
//! writer
//!     .write_var_int(12)
//!     .write_position(Position::new(100, -60, 250))
//!     .write_array(&["alpha", "beta"], |w, name| w.write_string(name))?;
//!
//! let mut reader = PacketReader::with_version(writer.finish(), 763)?;
//! assert_eq!(reader.packet_id(), 0x25);
//! assert_eq!(reader.read_var_int()?, 12);
//! assert_eq!(reader.read_position()?, Position::new(100, -60, 250));
//! assert_eq!(reader.read_array(|r| r.read_string())?, vec!["alpha", "beta"]);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::core::position::{Position, PositionLayout};
pub use crate::core::reader::PacketReader;
pub use crate::core::tag::Tag;
pub use crate::core::writer::PacketWriter;
pub use crate::error::{CodecError, Result};
