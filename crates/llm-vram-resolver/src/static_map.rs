//! In-memory resolver for pinned or test models.

use crate::error::{ResolverError, Result};
use crate::MetadataResolver;
use async_trait::async_trait;
use llm_vram_core::ModelMetadata;
use std::collections::HashMap;

/// Resolves from a fixed map of model id to metadata.
///
/// Entries are returned as stored; they must already carry `parameters`.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, ModelMetadata>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the metadata for `model_id`.
    pub fn insert(mut self, model_id: impl Into<String>, metadata: ModelMetadata) -> Self {
        self.entries.insert(model_id.into(), metadata);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl MetadataResolver for StaticResolver {
    fn name(&self) -> &str {
        "static"
    }

    async fn resolve(&self, model_id: &str) -> Result<ModelMetadata> {
        self.entries
            .get(model_id)
            .cloned()
            .ok_or_else(|| ResolverError::NotFound { model_id: model_id.to_string() })
    }
}
