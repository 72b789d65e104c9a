//! Fetching the bytes behind temporary resource references.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{PasteError, Result};

/// Host capability turning a `blob:` reference into raw bytes.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Resolver used when the host supplies none; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

#[async_trait]
impl ResourceResolver for NoResolver {
    async fn resolve(&self, reference: &str) -> Result<Vec<u8>> {
        Err(PasteError::Resolve {
            reference: reference.to_string(),
            msg: "no resource resolver configured".to_string(),
        })
    }
}

/// Resolver backed by an in-memory table, for hosts that already hold the
/// resource contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.resources.insert(reference.into(), bytes);
    }

    pub fn with(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(reference, bytes);
        self
    }
}

#[async_trait]
impl ResourceResolver for MemoryResolver {
    async fn resolve(&self, reference: &str) -> Result<Vec<u8>> {
        self.resources
            .get(reference)
            .cloned()
            .ok_or_else(|| PasteError::Resolve {
                reference: reference.to_string(),
                msg: "resource not found".to_string(),
            })
    }
}
