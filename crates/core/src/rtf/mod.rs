//! RTF structure scanning and image extraction.
//!
//! - `group`: brace-delimited group scanner and editor
//! - `image`: `\pict` group extraction into ordered image records

pub mod group;
pub mod image;

// Re-export main types for convenience
pub use group::{
    Group, GroupName, Groups, extract_group_content, find_group, find_groups, group_name,
    remove_groups, try_find_group,
};
pub use image::{ExistingImage, Placement, decide_placement, extract_images, image_id, image_type};
