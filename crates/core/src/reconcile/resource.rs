//! Resolution of `blob:` image sources through the host.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use html_escape::encode_double_quoted_attribute;
use regex::{Captures, Regex};
use tracing::warn;

use crate::codec::detect_signature;
use crate::error::{PasteError, Result};

use super::references::resource_references;
use super::{Diagnostic, Reconciled, Reconciler};

/// Fetch, sniff and encode a single resource.
async fn resolve_resource(reconciler: &Reconciler, reference: &str) -> Result<String> {
    let work = async {
        let bytes = reconciler.resolver.resolve(reference).await?;
        let image_type = detect_signature(&bytes);
        reconciler
            .encoder
            .encode(Arc::from(bytes), image_type)
            .await
            .ok_or_else(|| PasteError::Resolve {
                reference: reference.to_string(),
                msg: format!("unsupported image type {image_type}"),
            })
    };
    reconciler.bounded(reference, work).await?
}

/// Replace every occurrence of `references` in one pass, each with its
/// entry in `sources`; references without an entry are kept as they are.
///
/// Longer references are tried first, so a reference that is a prefix of
/// another (`blob:x/1`, `blob:x/10`) never eats into it.
fn substitute_all(
    html: &str,
    references: &[&str],
    sources: &HashMap<&str, String>,
) -> Result<String> {
    if sources.is_empty() {
        return Ok(html.to_string());
    }
    let mut references = references.to_vec();
    references.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = references
        .iter()
        .map(|r| regex::escape(r))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&alternation)?;
    let out = pattern.replace_all(html, |caps: &Captures| {
        let matched = &caps[0];
        sources.get(matched).cloned().unwrap_or_else(|| matched.to_string())
    });
    Ok(out.into_owned())
}

/// Replace every occurrence of each distinct resource reference.
///
/// Each reference is resolved once, all of them concurrently; one failure
/// only leaves that reference in place.
pub(crate) async fn reconcile_resources(
    reconciler: &Reconciler,
    html: &str,
    references: &[String],
) -> Reconciled {
    let resources = resource_references(references);
    if resources.is_empty() {
        return Reconciled::unchanged(html);
    }

    let resolved = join_all(
        resources
            .iter()
            .map(|reference| resolve_resource(reconciler, reference)),
    )
    .await;

    let ordered: Vec<&str> = resources.iter().copied().collect();
    let mut sources: HashMap<&str, String> = HashMap::new();
    let mut diagnostics = Vec::new();
    for (&reference, result) in resources.iter().zip(resolved) {
        match result {
            Ok(source) => {
                sources.insert(reference, encode_double_quoted_attribute(&source).into_owned());
            }
            Err(e) => {
                warn!(reference, error = %e, "cannot resolve image resource");
                diagnostics.push(Diagnostic::ResolveFailed {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let out = match substitute_all(html, &ordered, &sources) {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "cannot build resource pattern");
            for reference in resources.iter().filter(|r| sources.contains_key(*r)) {
                diagnostics.push(Diagnostic::ResolveFailed {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                });
            }
            html.to_string()
        }
    };

    Reconciled { html: out, diagnostics }
}
