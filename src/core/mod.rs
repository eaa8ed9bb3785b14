//! # Core Codec Components
//!
//! Cursor-based packet reading and writing, plus the encodings they share.
//!
//! ## Components
//! - **VarNum**: 7-bit continuation encoding for lengths, IDs, and counts
//! - **Position**: protocol-versioned 64-bit block position packing
//! - **Tag**: seam to the external tree-structured tag codec
//! - **Reader / Writer**: typed field access over one packet
//!
//! ## Wire Format
//! ```text
//! [PacketId(VarInt)] [Field...]
//! Compressed tag: [Length(i16 BE)] [Gzip(Length)]   Length = -1 -> absent
//! ```
//!
//! ## Security
//! - Array counts larger than the bytes remaining are rejected before allocation
//! - Decompressed tag payloads are capped (2 MiB by default)

pub mod position;
pub mod reader;
pub mod tag;
pub mod varnum;
pub mod writer;
