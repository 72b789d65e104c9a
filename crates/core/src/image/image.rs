//! Image types and image records.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Encoding of an embedded image.
///
/// RTF payloads tag every `\pict` group with a blip control word; resolved
/// resources are classified from their leading bytes instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Png,
    Jpeg,
    Gif,
    Emf,
    Wmf,
    Unknown,
}

/// Image types a browser can display from a data URI.
pub const SUPPORTED_IMAGE_TYPES: [ImageType; 3] = [ImageType::Png, ImageType::Jpeg, ImageType::Gif];

impl ImageType {
    /// MIME type of the encoding, `None` for [`ImageType::Unknown`].
    pub fn mime(self) -> Option<&'static str> {
        match self {
            ImageType::Png => Some("image/png"),
            ImageType::Jpeg => Some("image/jpeg"),
            ImageType::Gif => Some("image/gif"),
            ImageType::Emf => Some("image/emf"),
            ImageType::Wmf => Some("image/wmf"),
            ImageType::Unknown => None,
        }
    }

    /// Map a MIME type back to an image type.
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => ImageType::Png,
            "image/jpeg" | "image/jpg" => ImageType::Jpeg,
            "image/gif" => ImageType::Gif,
            "image/emf" | "image/x-emf" => ImageType::Emf,
            "image/wmf" | "image/x-wmf" => ImageType::Wmf,
            _ => ImageType::Unknown,
        }
    }

    pub fn is_supported(self) -> bool {
        SUPPORTED_IMAGE_TYPES.contains(&self)
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime().unwrap_or("unknown"))
    }
}

/// One image insertion found in the RTF payload.
///
/// Records are index-aligned with the `<img>` references of the HTML
/// payload. A record inserted several times shares its payload between
/// list entries, so cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// `\blipuid` or `\bliptag` value; `None` when the producer omitted both.
    pub id: Option<String>,
    pub image_type: ImageType,
    /// Raw image bytes. `None` for unsupported types and for groups whose
    /// hex digits could not be decoded.
    pub payload: Option<Arc<[u8]>>,
}

impl ImageRecord {
    pub fn new(id: Option<String>, image_type: ImageType, payload: Option<Vec<u8>>) -> Self {
        Self {
            id,
            image_type,
            payload: payload.map(Arc::from),
        }
    }

    /// Whether the record carries bytes that can be materialized.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Whether two records share the same payload allocation.
    pub fn shares_payload_with(&self, other: &ImageRecord) -> bool {
        match (&self.payload, &other.payload) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
