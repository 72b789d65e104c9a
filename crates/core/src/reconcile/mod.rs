//! Rewriting HTML image references with encoded image data.
//!
//! Two modes, picked per call:
//! - positional: an RTF payload is present; its `\pict` images are matched
//!   by index against the `<img>` tags and replace `file://` sources
//! - resource: no RTF; `blob:` sources are fetched through the host
//!   resolver and replaced everywhere they occur

pub mod diagnostics;
pub mod encoder;
pub mod positional;
pub mod references;
pub mod resolver;
pub mod resource;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{PasteError, Result};

pub use diagnostics::{Diagnostic, Reconciled};
pub use encoder::{BuiltinBase64Encoder, HostProvidedEncoder, ImageEncoder};
pub use references::{extract_image_sources, is_local_file, is_resource};
pub use resolver::{MemoryResolver, NoResolver, ResourceResolver};

/// Default bound on a single encode or resolve.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Reaction to differing image counts in HTML and RTF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Report a diagnostic and return the HTML unmodified.
    #[default]
    Lenient,
    /// Fail with [`PasteError::CountMismatch`].
    Strict,
}

/// Matches extracted images against the references of an HTML payload.
#[derive(Clone)]
pub struct Reconciler {
    encoder: Arc<dyn ImageEncoder>,
    resolver: Arc<dyn ResourceResolver>,
    timeout: Duration,
    mismatch_policy: MismatchPolicy,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinBase64Encoder), Arc::new(NoResolver))
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("timeout", &self.timeout)
            .field("mismatch_policy", &self.mismatch_policy)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(encoder: Arc<dyn ImageEncoder>, resolver: Arc<dyn ResourceResolver>) -> Self {
        Self {
            encoder,
            resolver,
            timeout: DEFAULT_RESOLVE_TIMEOUT,
            mismatch_policy: MismatchPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    pub fn encoder(&self) -> &Arc<dyn ImageEncoder> {
        &self.encoder
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn mismatch_policy(&self) -> MismatchPolicy {
        self.mismatch_policy
    }

    /// Rewrite the image references of `html`.
    ///
    /// Only [`MismatchPolicy::Strict`] turns a finding into an error; in
    /// every other case unresolved references are reported as diagnostics
    /// and left untouched.
    pub async fn reconcile(&self, html: &str, rtf: Option<&str>) -> Result<Reconciled> {
        let references = extract_image_sources(html);
        if references.is_empty() {
            return Ok(Reconciled::unchanged(html));
        }

        match rtf.filter(|rtf| !rtf.is_empty()) {
            Some(rtf) => {
                debug!(references = references.len(), "reconciling images from RTF");
                positional::reconcile_positional(self, html, rtf, &references).await
            }
            None => {
                debug!(references = references.len(), "reconciling resource images");
                Ok(resource::reconcile_resources(self, html, &references).await)
            }
        }
    }

    /// Run `work` under the configured timeout.
    pub(crate) async fn bounded<T>(&self, what: &str, work: impl Future<Output = T>) -> Result<T> {
        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| PasteError::Timeout {
                what: what.to_string(),
                millis: self.timeout.as_millis(),
            })
    }
}
