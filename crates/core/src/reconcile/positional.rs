//! Positional matching of RTF images against `<img>` tags.

use futures::future::join_all;
use html_escape::encode_double_quoted_attribute;
use tracing::{debug, warn};

use crate::error::{PasteError, Result};
use crate::image::ImageRecord;
use crate::rtf::extract_images;

use super::references::{is_local_file, replace_image_source};
use super::{Diagnostic, MismatchPolicy, Reconciled, Reconciler};

/// Outcome of encoding one record.
enum Encoded {
    Source(String),
    /// The record carries no bytes (unsupported type or undecodable data).
    NoData,
    /// The encoder gave up, timed out or returned nothing.
    Failed(String),
}

/// Encode every record concurrently; results keep record order.
async fn encode_records(reconciler: &Reconciler, records: &[ImageRecord]) -> Vec<Encoded> {
    let jobs = records.iter().enumerate().map(|(index, record)| async move {
        let Some(payload) = record.payload.clone() else {
            return Encoded::NoData;
        };
        let what = format!("image {}", index + 1);
        match reconciler
            .bounded(&what, reconciler.encoder().encode(payload, record.image_type))
            .await
        {
            Ok(Some(src)) => Encoded::Source(src),
            Ok(None) => Encoded::Failed("encoder returned no source".to_string()),
            Err(e) => {
                warn!(error = %e, "image encoding abandoned");
                Encoded::Failed(e.to_string())
            }
        }
    });
    join_all(jobs).await
}

/// Replace `file://` image sources with the encoded RTF image at the same
/// position.
pub(crate) async fn reconcile_positional(
    reconciler: &Reconciler,
    html: &str,
    rtf: &str,
    references: &[String],
) -> Result<Reconciled> {
    let records = extract_images(rtf);

    // Checked before encoding so a host encoder never sees images of a
    // pass that leaves the HTML untouched.
    if references.len() != records.len() {
        warn!(
            references = references.len(),
            records = records.len(),
            "image count differs between HTML and RTF"
        );
        if reconciler.mismatch_policy() == MismatchPolicy::Strict {
            return Err(PasteError::CountMismatch {
                references: references.len(),
                records: records.len(),
            });
        }
        return Ok(Reconciled {
            html: html.to_string(),
            diagnostics: vec![Diagnostic::CountMismatch {
                references: references.len(),
                records: records.len(),
            }],
        });
    }

    let sources = encode_records(reconciler, &records).await;

    let mut out = html.to_string();
    let mut diagnostics = Vec::new();
    for (index, (reference, source)) in references.iter().zip(sources).enumerate() {
        if !is_local_file(reference) {
            continue;
        }
        let image_type = records[index].image_type;
        let source = match source {
            Encoded::Source(source) => source,
            Encoded::NoData => {
                warn!(index, image_type = %image_type, "no image data for reference");
                diagnostics.push(Diagnostic::UnresolvedReference {
                    index,
                    reference: reference.clone(),
                    image_type,
                });
                continue;
            }
            Encoded::Failed(reason) => {
                warn!(index, reason = %reason, "image not encoded");
                diagnostics.push(Diagnostic::EncodeFailed {
                    index,
                    reference: reference.clone(),
                    reason,
                });
                continue;
            }
        };
        let source = encode_double_quoted_attribute(&source);
        match replace_image_source(&out, reference, &source) {
            Some(next) => out = next,
            None => debug!(index, "reference is not an <img> source"),
        }
    }

    Ok(Reconciled { html: out, diagnostics })
}
