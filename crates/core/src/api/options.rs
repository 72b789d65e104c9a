//! Options for processing a paste.

use std::time::Duration;

use crate::reconcile::{DEFAULT_RESOLVE_TIMEOUT, MismatchPolicy};

/// Options for [`PasteProcessor`](super::PasteProcessor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteOptions {
    /// Upper bound for one image encode or resource fetch.
    pub resolve_timeout: Duration,

    /// What to do when HTML and RTF disagree on the number of images.
    pub mismatch_policy: MismatchPolicy,

    /// Ignore a dropped file and use the HTML payload instead.
    pub ignore_single_file: bool,
}

impl Default for PasteOptions {
    fn default() -> Self {
        Self {
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            mismatch_policy: MismatchPolicy::Lenient,
            ignore_single_file: false,
        }
    }
}
