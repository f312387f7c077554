//! Ordered fallback over several resolvers.

use crate::error::{ResolverError, Result};
use crate::MetadataResolver;
use async_trait::async_trait;
use llm_vram_core::ModelMetadata;
use tracing::{debug, info};

/// Tries each resolver in order and returns the first success.
///
/// Failures are collected; if every member fails the chain returns
/// [`ResolverError::NoStrategySucceeded`] listing each attempt.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn MetadataResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver; it is tried after the ones already added.
    pub fn with(mut self, resolver: impl MetadataResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn push(&mut self, resolver: Box<dyn MetadataResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Member names in lookup order.
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain").field("resolvers", &self.names()).finish()
    }
}

#[async_trait]
impl MetadataResolver for ResolverChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn resolve(&self, model_id: &str) -> Result<ModelMetadata> {
        let mut attempts = Vec::with_capacity(self.resolvers.len());
        for resolver in &self.resolvers {
            match resolver.resolve(model_id).await {
                Ok(metadata) => {
                    info!(resolver = resolver.name(), model_id, "resolved model metadata");
                    return Ok(metadata);
                }
                Err(e) => {
                    debug!(resolver = resolver.name(), model_id, error = %e, "resolver failed");
                    attempts.push(format!("{}: {e}", resolver.name()));
                }
            }
        }
        Err(ResolverError::NoStrategySucceeded { model_id: model_id.to_string(), attempts })
    }
}
