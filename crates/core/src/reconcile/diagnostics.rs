//! Non-fatal findings of a reconciliation pass.

use std::fmt;

use serde::Serialize;

use crate::image::ImageType;

/// A warning about a reference that could not be rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// HTML and RTF disagree on the number of images; nothing was rewritten.
    CountMismatch { references: usize, records: usize },
    /// The image at `index` has no encoded counterpart.
    UnresolvedReference {
        index: usize,
        reference: String,
        image_type: ImageType,
    },
    /// The image at `index` has data but the encoder produced no source.
    EncodeFailed {
        index: usize,
        reference: String,
        reason: String,
    },
    /// A resource reference could not be fetched or encoded.
    ResolveFailed { reference: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CountMismatch {
                references,
                records,
            } => write!(
                f,
                "image count mismatch: {references} in HTML, {records} in RTF"
            ),
            Diagnostic::UnresolvedReference {
                index,
                reference,
                image_type,
            } => write!(
                f,
                "image {} ({reference}) has no {image_type} data",
                index + 1
            ),
            Diagnostic::EncodeFailed {
                index,
                reference,
                reason,
            } => write!(f, "image {} ({reference}) not encoded: {reason}", index + 1),
            Diagnostic::ResolveFailed { reference, reason } => {
                write!(f, "cannot resolve {reference}: {reason}")
            }
        }
    }
}

/// Rewritten HTML plus whatever could not be rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciled {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Reconciled {
    /// The input returned as is.
    pub fn unchanged(html: &str) -> Self {
        Self {
            html: html.to_string(),
            diagnostics: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
