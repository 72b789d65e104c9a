//! Turning image bytes into `src` attribute values.
//!
//! The encoder is chosen once when the processor is built: either the
//! built-in data URI encoder or a host callback (for example one that
//! uploads the image and returns its hosted URL).

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::codec::data_uri;
use crate::image::ImageType;

/// Produces the text placed in an image's `src` attribute.
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    /// Encode `bytes` of the given type. `None` means the image cannot be
    /// represented and its reference stays unresolved.
    async fn encode(&self, bytes: Arc<[u8]>, image_type: ImageType) -> Option<String>;
}

/// Encodes supported images as `data:<mime>;base64,...` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinBase64Encoder;

#[async_trait]
impl ImageEncoder for BuiltinBase64Encoder {
    async fn encode(&self, bytes: Arc<[u8]>, image_type: ImageType) -> Option<String> {
        if !image_type.is_supported() {
            return None;
        }
        image_type.mime().map(|mime| data_uri(mime, &bytes))
    }
}

type HostHandler = dyn Fn(Arc<[u8]>, ImageType) -> BoxFuture<'static, Option<String>> + Send + Sync;

/// Delegates encoding of supported images to a host-supplied callback.
#[derive(Clone)]
pub struct HostProvidedEncoder {
    handler: Arc<HostHandler>,
}

impl HostProvidedEncoder {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Arc<[u8]>, ImageType) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |bytes, image_type| handler(bytes, image_type).boxed()),
        }
    }
}

impl std::fmt::Debug for HostProvidedEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostProvidedEncoder").finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageEncoder for HostProvidedEncoder {
    async fn encode(&self, bytes: Arc<[u8]>, image_type: ImageType) -> Option<String> {
        // The host never sees images that cannot be displayed.
        if !image_type.is_supported() {
            return None;
        }
        (self.handler)(bytes, image_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_encoder() {
        let encoder = BuiltinBase64Encoder;
        let png: Arc<[u8]> = Arc::from(&[0x89, 0x50, 0x4e, 0x47][..]);
        assert_eq!(
            encoder.encode(png.clone(), ImageType::Png).await.as_deref(),
            Some("data:image/png;base64,iVBORw==")
        );
        assert_eq!(encoder.encode(png, ImageType::Emf).await, None);
    }

    #[tokio::test]
    async fn test_host_encoder() {
        let encoder = HostProvidedEncoder::new(|bytes: Arc<[u8]>, image_type| async move {
            Some(format!("https://cdn.example/{}/{}", image_type.mime()?, bytes.len()))
        });
        let bytes: Arc<[u8]> = Arc::from(&[1u8, 2, 3][..]);
        assert_eq!(
            encoder.encode(bytes.clone(), ImageType::Gif).await.as_deref(),
            Some("https://cdn.example/image/gif/3")
        );
        assert_eq!(encoder.encode(bytes, ImageType::Wmf).await, None);
    }
}
