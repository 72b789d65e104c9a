//! Image type detection from magic bytes.

use crate::image::ImageType;

use super::hex::bytes_to_hex;

/// Known signatures, as lowercase hex prefixes.
const SIGNATURES: [(&str, ImageType); 3] = [
    ("ffd8ff", ImageType::Jpeg),
    ("47494638", ImageType::Gif),
    ("89504e47", ImageType::Png),
];

/// Classify raw image bytes by their first four bytes.
///
/// Returns [`ImageType::Unknown`] when no signature matches.
pub fn detect_signature(bytes: &[u8]) -> ImageType {
    let head = bytes_to_hex(&bytes[..bytes.len().min(4)]);
    SIGNATURES
        .iter()
        .find(|(signature, _)| head.starts_with(signature))
        .map(|&(_, ty)| ty)
        .unwrap_or(ImageType::Unknown)
}
