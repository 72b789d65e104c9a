//! Image record extraction from `\pict` groups.
//!
//! Word writes one `\pict` group per image insertion. The same image may be
//! written several times (same id, same encoding), and an image may be
//! followed by an alternate encoding of itself (same id, other encoding).
//! Extraction folds these into one record per visual insertion so that the
//! list lines up with the `<img>` tags of the HTML payload.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::codec::hex_to_bytes;
use crate::image::{ImageRecord, ImageType};

use super::group::{GroupName, extract_group_content, find_groups, remove_groups};

/// Headers, footers, non-Word images and drawn objects.
static NOISE_GROUPS: LazyLock<GroupName> = LazyLock::new(|| {
    GroupName::pattern(r"(?:(?:header|footer)[lrf]?|nonshppict|shprslt)").unwrap()
});

static PICT_GROUPS: LazyLock<GroupName> = LazyLock::new(|| GroupName::pattern("pict").unwrap());

static BLIP_UID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\blipuid (\w+)\}").unwrap());

static BLIP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\bliptag(-?\d+)").unwrap());

/// Encoding markers, tested in order.
static TYPE_MARKERS: LazyLock<[(Regex, ImageType); 4]> = LazyLock::new(|| {
    [
        (Regex::new(r"\\pngblip").unwrap(), ImageType::Png),
        (Regex::new(r"\\jpegblip").unwrap(), ImageType::Jpeg),
        (Regex::new(r"\\emfblip").unwrap(), ImageType::Emf),
        (Regex::new(r"\\wmetafile\d").unwrap(), ImageType::Wmf),
    ]
});

/// WordArt shapes are declared with `\defshp`.
const WORD_ART_MARKER: &str = r"\defshp";

/// Identifier of a `\pict` group: `\blipuid` first, then `\bliptag`.
pub fn image_id(group: &str) -> Option<String> {
    BLIP_UID
        .captures(group)
        .or_else(|| BLIP_TAG.captures(group))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Encoding declared by a `\pict` group.
pub fn image_type(group: &str) -> ImageType {
    TYPE_MARKERS
        .iter()
        .find(|(marker, _)| marker.is_match(group))
        .map(|&(_, ty)| ty)
        .unwrap_or(ImageType::Unknown)
}

/// Record already extracted under the same id as the current group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingImage {
    pub index: usize,
    pub image_type: ImageType,
    pub has_payload: bool,
    /// The record is the most recently appended one.
    pub is_last: bool,
}

/// What to do with a freshly scanned `\pict` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// New image: push a record.
    Append,
    /// Same image inserted again: push another entry sharing the record at
    /// this index.
    Duplicate(usize),
    /// Alternate encoding or shape: drop the group.
    Discard,
    /// Supersedes the record at this index.
    Replace(usize),
}

/// Decide how a group with `image_type` relates to the records extracted so far.
pub fn decide_placement(
    existing: Option<ExistingImage>,
    image_type: ImageType,
    is_word_art: bool,
) -> Placement {
    match existing {
        Some(found) if found.has_payload && found.image_type == image_type => {
            Placement::Duplicate(found.index)
        }
        Some(found) if found.has_payload && found.is_last => Placement::Discard,
        _ if is_word_art => Placement::Discard,
        Some(found) => Placement::Replace(found.index),
        None => Placement::Append,
    }
}

fn build_record(group: &str, id: Option<String>, image_type: ImageType) -> ImageRecord {
    let payload = if image_type.is_supported() {
        let digits: String = extract_group_content(group)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        match hex_to_bytes(&digits) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(id = ?id, error = %e, "dropping undecodable image data");
                None
            }
        }
    } else {
        None
    };
    ImageRecord::new(id, image_type, payload)
}

/// Extract the ordered image records of an RTF payload.
pub fn extract_images(rtf: &str) -> Vec<ImageRecord> {
    let rtf = remove_groups(rtf, &NOISE_GROUPS);
    let mut records: Vec<ImageRecord> = Vec::new();

    for group in find_groups(&rtf, &PICT_GROUPS) {
        let content = group.content;
        let id = image_id(content);
        let ty = image_type(content);
        // Ids are optional (LibreOffice omits them); id-less images never match.
        let existing = id.as_deref().and_then(|id| {
            records
                .iter()
                .position(|r| r.id.as_deref() == Some(id))
                .map(|index| ExistingImage {
                    index,
                    image_type: records[index].image_type,
                    has_payload: records[index].has_payload(),
                    is_last: index + 1 == records.len(),
                })
        });

        match decide_placement(existing, ty, content.contains(WORD_ART_MARKER)) {
            Placement::Append => records.push(build_record(content, id, ty)),
            Placement::Duplicate(index) => {
                let duplicate = records[index].clone();
                records.push(duplicate);
            }
            Placement::Discard => {
                debug!(id = ?id, image_type = %ty, offset = group.start, "discarding pict group");
            }
            Placement::Replace(index) => records[index] = build_record(content, id, ty),
        }
    }

    records
}
