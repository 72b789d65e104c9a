//! `<img>` references of the HTML payload.

use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::{Captures, Regex};
use tracing::warn;

static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src="([^"]+)[^>]+"#).unwrap());

/// `src` values of all `<img>` tags, in document order.
pub fn extract_image_sources(html: &str) -> Vec<String> {
    IMG_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Reference to a file on the producer's disk (`file://`).
pub fn is_local_file(reference: &str) -> bool {
    reference.starts_with("file://")
}

/// Reference to a temporary binary resource (`blob:`).
pub fn is_resource(reference: &str) -> bool {
    reference
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("blob:"))
}

/// Distinct resource references, in order of first appearance.
pub fn resource_references(references: &[String]) -> IndexSet<&str> {
    references
        .iter()
        .map(String::as_str)
        .filter(|r| is_resource(r))
        .collect()
}

/// Replace the first `reference` used as the `src` of an `<img>` tag.
///
/// Shapes written as VML may point at the same file; only `<img ...src=`
/// constructs are rewritten. Returns `None` when no such tag exists.
pub fn replace_image_source(html: &str, reference: &str, replacement: &str) -> Option<String> {
    let pattern = format!(r#"(<img [^>]*src=["']?){}"#, regex::escape(reference));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!(reference, error = %e, "cannot build image source pattern");
            return None;
        }
    };
    if !re.is_match(html) {
        return None;
    }
    let replaced = re.replacen(html, 1, |caps: &Captures| format!("{}{}", &caps[1], replacement));
    Some(replaced.into_owned())
}
