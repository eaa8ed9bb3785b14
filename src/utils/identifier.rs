//! Text form of 16-byte identifiers (UUIDs).

use crate::error::{CodecError, Result};
use uuid::Uuid;

/// Length of the hyphenated text form, e.g. `069a79f4-44e9-4726-a5be-fca90e38aaf5`
pub const HYPHENATED_LEN: usize = 36;

/// Parse a hyphenated identifier into its 16 raw bytes
///
/// # Errors
/// Returns `CodecError::InvalidIdentifier` if `text` is not a 36-character hyphenated UUID
pub fn parse_identifier(text: &str) -> Result<[u8; 16]> {
    if text.len() != HYPHENATED_LEN {
        return Err(CodecError::InvalidIdentifier(format!(
            "expected {HYPHENATED_LEN} characters, got {}",
            text.len()
        )));
    }

    Uuid::parse_str(text)
        .map(|id| *id.as_bytes())
        .map_err(|e| CodecError::InvalidIdentifier(format!("'{text}': {e}")))
}

/// Format 16 raw bytes as a lowercase hyphenated identifier
pub fn format_identifier(bytes: [u8; 16]) -> String {
    Uuid::from_bytes(bytes).hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTCH: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_parse_and_format() {
        let bytes = parse_identifier(NOTCH).unwrap();
        assert_eq!(bytes[0], 0x06);
        assert_eq!(bytes[15], 0xF5);
        assert_eq!(format_identifier(bytes), NOTCH);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_uppercase_input_formats_lowercase() {
        let bytes = parse_identifier(&NOTCH.to_uppercase()).unwrap();
        assert_eq!(format_identifier(bytes), NOTCH);
    }

    #[test]
    fn test_rejects_simple_form() {
        let simple = NOTCH.replace('-', "");
        assert!(matches!(
            parse_identifier(&simple),
            Err(CodecError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_rejects_bad_hex() {
        let bad = "zz9a79f4-44e9-4726-a5be-fca90e38aaf5";
        assert!(matches!(
            parse_identifier(bad),
            Err(CodecError::InvalidIdentifier(_))
        ));
    }
}
