//! wordpaste - turn Word clipboard data into self-contained HTML.
//!
//! Word puts two views of a selection on the clipboard: HTML whose images
//! point at temporary local files, and RTF that embeds the image bytes in
//! `\pict` groups. This crate extracts the images from the RTF and rewrites
//! the HTML so every image is inlined.

pub mod api;
pub mod codec;
pub mod error;
pub mod image;
pub mod reconcile;
pub mod rtf;

pub use api::{
    ClipboardPayload, DroppedFile, PasteOptions, PasteOutput, PasteProcessor,
    PasteProcessorBuilder,
};
pub use error::{PasteError, Result};
pub use image::{ImageRecord, ImageType};
pub use reconcile::{Diagnostic, Reconciled, Reconciler};
