//! Error types for the wordpaste library.

use thiserror::Error;

/// Primary error type for clipboard reconciliation.
#[derive(Error, Debug)]
pub enum PasteError {
    #[error("malformed image data: {0}")]
    MalformedData(String),

    #[error("unterminated group starting at offset {offset}")]
    UnterminatedGroup { offset: usize },

    #[error("invalid group name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("image count mismatch: {references} references in HTML, {records} images in RTF")]
    CountMismatch { references: usize, records: usize },

    #[error("failed to resolve {reference}: {msg}")]
    Resolve { reference: String, msg: String },

    #[error("timed out after {millis} ms while processing {what}")]
    Timeout { what: String, millis: u128 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for PasteError.
pub type Result<T> = std::result::Result<T, PasteError>;
