//! Hex digit strings as stored in RTF `\pict` groups.

use crate::error::{PasteError, Result};

/// Decode a string of hex digits into bytes, two digits per byte.
///
/// Both digit cases are accepted. An odd number of digits or a non-hex
/// character fails with [`PasteError::MalformedData`] instead of silently
/// dropping the trailing nibble.
pub fn hex_to_bytes(digits: &str) -> Result<Vec<u8>> {
    hex::decode(digits).map_err(|e| match e {
        hex::FromHexError::OddLength => {
            PasteError::MalformedData(format!("odd number of hex digits ({})", digits.len()))
        }
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            PasteError::MalformedData(format!("invalid hex digit {c:?} at index {index}"))
        }
        other => PasteError::MalformedData(other.to_string()),
    })
}

/// Encode bytes as lowercase hex digits.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
