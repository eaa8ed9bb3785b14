//! Gzip compression for compressed tag payloads.
//!
//! Synchronous functions run on the caller's thread. The `_async` variants move the
//! work onto tokio's blocking pool and must be awaited inside a tokio runtime.

use crate::config::MAX_PAYLOAD_SIZE;
use crate::error::{CodecError, Result};
use bytes::Bytes;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Maximum output size for decompression (align with MAX_PAYLOAD_SIZE to prevent DoS)
pub const MAX_DECOMPRESSION_SIZE: usize = MAX_PAYLOAD_SIZE;

/// Offset of the gzip header's OS byte, which varies between encoders
pub const GZIP_OS_BYTE_OFFSET: usize = 9;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Smallest well-formed gzip member: 10-byte header, empty deflate block, 8-byte trailer
const MIN_GZIP_LEN: usize = 20;

/// Gzip-compress `data`
///
/// # Errors
/// Returns `CodecError::CompressionFailure` if the encoder fails
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(data.len() / 2 + 32),
        Compression::default(),
    );
    encoder
        .write_all(data)
        .map_err(|_| CodecError::CompressionFailure)?;
    encoder.finish().map_err(|_| CodecError::CompressionFailure)
}

/// Decompress gzip `data` with the default size ceiling
///
/// # Errors
/// Returns `CodecError::DecompressionFailure` if the data is not valid gzip or
/// inflates past MAX_DECOMPRESSION_SIZE
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with_limit(data, MAX_DECOMPRESSION_SIZE)
}

/// Decompress gzip `data`, failing once the output grows past `limit` bytes
///
/// # Errors
/// Returns `CodecError::DecompressionFailure` if:
/// - The data is shorter than a gzip header or lacks the gzip magic
/// - Inflation fails, including on trailing bytes after the last member
/// - Output size exceeds `limit`
pub fn decompress_with_limit(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    if data.len() < MIN_GZIP_LEN || data[..2] != GZIP_MAGIC {
        return Err(CodecError::DecompressionFailure);
    }

    // Concatenated members inflate in sequence; trailing non-gzip bytes are an error
    let mut decoder = MultiGzDecoder::new(data);
    let mut out = Vec::new();

    // Read in chunks to enforce size limit
    let mut buffer = [0u8; 8192];
    loop {
        match decoder.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                out.extend_from_slice(&buffer[..n]);
                if out.len() > limit {
                    return Err(CodecError::DecompressionFailure);
                }
            }
            Err(_) => return Err(CodecError::DecompressionFailure),
        }
    }
    Ok(out)
}

/// Clear the gzip OS byte so identical input always yields identical output
pub fn normalize_header(compressed: &mut [u8]) {
    if let Some(os) = compressed.get_mut(GZIP_OS_BYTE_OFFSET) {
        *os = 0;
    }
}

/// Gzip-compress `data` on the blocking pool
pub async fn compress_async(data: Vec<u8>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || compress(&data))
        .await
        .map_err(|_| CodecError::CompressionFailure)?
}

/// Decompress gzip `data` on the blocking pool, bounded by `limit`
pub async fn decompress_async(data: Bytes, limit: usize) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || decompress_with_limit(&data, limit))
        .await
        .map_err(|_| CodecError::DecompressionFailure)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_gzip_roundtrip() {
        let original = b"Hello, World! This is a test of gzip compression.";
        let compressed = compress(original).unwrap();
        assert_eq!(&compressed[..2], &GZIP_MAGIC);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(original.as_slice(), decompressed.as_slice());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_empty_input_roundtrip() {
        let compressed = compress(&[]).unwrap();
        assert!(compressed.len() >= MIN_GZIP_LEN);
        assert!(decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_normalized_header_still_decodes() {
        let mut compressed = compress(b"normalize me").unwrap();
        normalize_header(&mut compressed);
        assert_eq!(compressed[GZIP_OS_BYTE_OFFSET], 0);
        assert_eq!(decompress(&compressed).unwrap(), b"normalize me");
    }

    #[test]
    fn test_normalize_short_buffer_is_noop() {
        let mut short = vec![0x1F, 0x8B, 0x08];
        normalize_header(&mut short);
        assert_eq!(short, vec![0x1F, 0x8B, 0x08]);
    }

    #[test]
    fn test_short_input_rejection() {
        let result = decompress(&[0x1F, 0x8B]);
        assert!(matches!(result, Err(CodecError::DecompressionFailure)));
    }

    #[test]
    fn test_malformed_compressed_data() {
        let malformed = vec![0xAB; 64];
        let result = decompress(&malformed);
        assert!(result.is_err(), "Should reject data without gzip magic");

        let mut truncated_body = GZIP_MAGIC.to_vec();
        truncated_body.extend_from_slice(&[0x08, 0, 0, 0, 0, 0, 0, 0xFF]);
        truncated_body.extend_from_slice(&[0xFF; 12]);
        assert!(decompress(&truncated_body).is_err());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_size_limit_enforcement() {
        // Highly compressible payload inflating well past the limit
        let big = vec![0u8; 64 * 1024];
        let compressed = compress(&big).unwrap();
        let result = decompress_with_limit(&compressed, 1024);
        assert!(matches!(result, Err(CodecError::DecompressionFailure)));
        assert_eq!(decompress_with_limit(&compressed, big.len()).unwrap(), big);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_concatenated_members_inflate_in_order() {
        let mut joined = compress(b"first-").unwrap();
        joined.extend_from_slice(&compress(b"second").unwrap());
        assert_eq!(decompress(&joined).unwrap(), b"first-second");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_trailing_bytes_rejected() {
        let mut compressed = compress(b"ok").unwrap();
        compressed.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(
            decompress(&compressed),
            Err(CodecError::DecompressionFailure)
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_limit_spans_all_members() {
        let member = compress(&[7u8; 600]).unwrap();
        let mut joined = member.clone();
        joined.extend_from_slice(&member);
        let result = decompress_with_limit(&joined, 1000);
        assert!(matches!(result, Err(CodecError::DecompressionFailure)));
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_async_roundtrip() {
        let data = b"async gzip payload".repeat(20);
        let compressed = compress_async(data.clone()).await.unwrap();
        let decompressed = decompress_async(Bytes::from(compressed), MAX_DECOMPRESSION_SIZE)
            .await
            .unwrap();
        assert_eq!(decompressed, data);
    }
}
