//! # Error Types
//!
//! Error handling for the packet codec.
//!
//! Every fallible reader, writer, compression, or configuration operation returns
//! [`CodecError`]. Failures are local to the operation in progress: the codec never
//! retries and never rolls back fields already consumed or produced, so a caller that
//! sees an error should discard the reader or writer (and its buffer).
//!
//! ## Error Categories
//! - **Bounds Errors**: not enough bytes left for a fixed-width or length-prefixed read
//! - **Encoding Errors**: malformed VarNum chains, negative lengths, bad UTF-8 or JSON
//! - **Collaborator Errors**: tag codec, identifier text, and gzip failures
//! - **Configuration Errors**: unreadable or invalid configuration
//!
//! ## Example Usage
//! ```rust
//! use craft_protocol::core::reader::PacketReader;
//! use craft_protocol::error::{CodecError, Result};
//!
//! fn read_id(buf: &'static [u8]) -> Result<i32> {
//!     let reader = PacketReader::new(buf)?;
//!     Ok(reader.packet_id())
//! }
//!
//! assert_eq!(read_id(&[0x2A]).ok(), Some(42));
//! assert!(matches!(read_id(&[]), Err(CodecError::OutOfBounds { .. })));
//! ```

use std::string::FromUtf8Error;
use thiserror::Error;

// CodecError is the error type for every codec operation
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Out of bounds: needed {requested} bytes but only {remaining} remain")]
    OutOfBounds { requested: usize, remaining: usize },

    #[error("Malformed VarNum: continuation chain exceeds {max_bytes} bytes")]
    MalformedVarNum { max_bytes: usize },

    #[error("Invalid length prefix: {0}")]
    InvalidLength(i64),

    #[error("Array count {count} exceeds the {remaining} bytes remaining")]
    ArrayTooLong { count: usize, remaining: usize },

    #[error("Invalid UTF-8 in string payload: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("Malformed JSON payload: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Tag codec error: {0}")]
    Tag(String),

    #[error("Compression failed")]
    CompressionFailure,

    #[error("Decompression failed")]
    DecompressionFailure,

    #[error("Payload too large: {0} bytes")]
    OversizedPayload(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = CodecError::OutOfBounds {
            requested: 4,
            remaining: 1,
        };
        assert_eq!(
            err.to_string(),
            "Out of bounds: needed 4 bytes but only 1 remain"
        );
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_utf8_conversion() {
        let bad = String::from_utf8(vec![0xC3, 0x28]).unwrap_err();
        let err: CodecError = bad.into();
        assert!(matches!(err, CodecError::InvalidUtf8(_)));
    }
}
