//! Base64 and data URI encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode bytes with the standard alphabet (`A-Z a-z 0-9 + /`).
///
/// Every 3 input bytes become 4 characters; a short final group is
/// zero-padded and each missing byte is written as `=`.
pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Build a `data:<mime>;base64,<payload>` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let mut out = String::with_capacity(mime.len() + 13 + bytes.len().div_ceil(3) * 4);
    out.push_str("data:");
    out.push_str(mime);
    out.push_str(";base64,");
    STANDARD.encode_string(bytes, &mut out);
    out
}
