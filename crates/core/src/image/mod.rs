//! Image model shared by the extractor, the codec and the reconciler.
//!
//! This module provides the image type classification and the record
//! produced for every image found in an RTF payload.

pub mod image;

pub use image::*;
