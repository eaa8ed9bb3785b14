//! # Utility Modules
//!
//! Collaborators the codec delegates to, plus logging setup.
//!
//! ## Components
//! - **Compression**: gzip for compressed tags, with a decompression size ceiling
//! - **Identifier**: UUID text parsing and formatting
//! - **Logging**: `tracing-subscriber` configuration
//!
//! ## Security
//! - Decompression bomb protection (2 MiB default limit)

pub mod compression;
pub mod identifier;
pub mod logging;
