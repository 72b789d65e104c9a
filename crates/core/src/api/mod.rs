//! High-level API module for paste processing.
//!
//! This module provides the main public API: options, a fluent builder and
//! the clipboard pipeline that ties the RTF extractor and the reconciler
//! together.
//!
//! # Example
//!
//! ```ignore
//! use wordpaste_core::api::{ClipboardPayload, PasteProcessor};
//!
//! let processor = PasteProcessor::builder().build();
//! let output = processor.process(ClipboardPayload { html, text, rtf: Some(rtf), file: None }).await?;
//! ```

pub mod builder;
pub mod options;
pub mod paste;

// Re-export for convenience
pub use builder::PasteProcessorBuilder;
pub use options::PasteOptions;
pub use paste::{
    ClipboardPayload, DroppedFile, Generator, PasteOutput, PasteProcessor, content_generator,
    is_office_content, strip_html,
};
