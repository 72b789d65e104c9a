//! Builder pattern for paste processing.
//!
//! Provides a fluent API for configuring a [`PasteProcessor`].
//!
//! # Example
//! ```ignore
//! use wordpaste_core::api::PasteProcessorBuilder;
//!
//! let processor = PasteProcessorBuilder::new()
//!     .timeout(Duration::from_secs(3))
//!     .strict(true)
//!     .resolver(my_resolver)
//!     .build();
//! let output = processor.process(payload).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::image::ImageType;
use crate::reconcile::{
    BuiltinBase64Encoder, HostProvidedEncoder, ImageEncoder, MismatchPolicy, NoResolver,
    Reconciler, ResourceResolver,
};

use super::options::PasteOptions;
use super::paste::PasteProcessor;

/// A builder for configuring paste processing.
///
/// This wraps [`PasteOptions`] and the host capabilities; the image encoder
/// is fixed when [`build`](Self::build) is called.
#[derive(Clone, Default)]
pub struct PasteProcessorBuilder {
    options: PasteOptions,
    resolver: Option<Arc<dyn ResourceResolver>>,
    encoder: Option<Arc<dyn ImageEncoder>>,
}

impl PasteProcessorBuilder {
    /// Creates a builder with default options, the built-in base64 encoder
    /// and no resource resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: PasteOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the bound for a single image encode or resource fetch.
    ///
    /// # Example
    /// ```ignore
    /// let builder = PasteProcessorBuilder::new().timeout(Duration::from_millis(500));
    /// ```
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.resolve_timeout = timeout;
        self
    }

    /// Sets the count-mismatch policy.
    pub fn mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.options.mismatch_policy = policy;
        self
    }

    /// Shorthand for [`MismatchPolicy::Strict`] (`true`) or
    /// [`MismatchPolicy::Lenient`] (`false`).
    pub fn strict(self, strict: bool) -> Self {
        self.mismatch_policy(if strict {
            MismatchPolicy::Strict
        } else {
            MismatchPolicy::Lenient
        })
    }

    /// Sets whether a dropped file is ignored in favour of the HTML payload.
    pub fn ignore_single_file(mut self, ignore: bool) -> Self {
        self.options.ignore_single_file = ignore;
        self
    }

    /// Sets the host capability used to fetch `blob:` references.
    pub fn resolver(mut self, resolver: impl ResourceResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets a custom image encoder.
    pub fn encoder(mut self, encoder: impl ImageEncoder + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Routes supported images through a host callback instead of data URIs.
    ///
    /// # Example
    /// ```ignore
    /// let builder = PasteProcessorBuilder::new()
    ///     .image_handler(|bytes, image_type| async move { upload(bytes, image_type).await.ok() });
    /// ```
    pub fn image_handler<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Arc<[u8]>, ImageType) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        self.encoder(HostProvidedEncoder::new(handler))
    }

    /// Builds the processor.
    pub fn build(self) -> PasteProcessor {
        let encoder: Arc<dyn ImageEncoder> = match self.encoder {
            Some(encoder) => encoder,
            None => Arc::new(BuiltinBase64Encoder),
        };
        let resolver: Arc<dyn ResourceResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(NoResolver),
        };
        let reconciler = Reconciler::new(encoder, resolver)
            .with_timeout(self.options.resolve_timeout)
            .with_mismatch_policy(self.options.mismatch_policy);
        PasteProcessor::from_parts(reconciler, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let processor = PasteProcessorBuilder::new().build();
        assert_eq!(processor.options(), &PasteOptions::default());
        assert_eq!(processor.reconciler().mismatch_policy(), MismatchPolicy::Lenient);
    }

    #[test]
    fn test_builder_settings_reach_reconciler() {
        let processor = PasteProcessorBuilder::new()
            .timeout(Duration::from_millis(250))
            .strict(true)
            .ignore_single_file(true)
            .build();
        assert_eq!(processor.reconciler().timeout(), Duration::from_millis(250));
        assert_eq!(processor.reconciler().mismatch_policy(), MismatchPolicy::Strict);
        assert!(processor.options().ignore_single_file);
    }

    #[test]
    fn test_strict_false_restores_lenient() {
        let builder = PasteProcessorBuilder::new().strict(true).strict(false);
        assert_eq!(builder.build().options().mismatch_policy, MismatchPolicy::Lenient);
    }
}
