//! Model metadata resolvers for llm-vram.
//!
//! A resolver turns a model identifier (`"Nexusflow/Starling-LM-7B-beta"`)
//! into the flat metadata map the estimation engine validates: the model's
//! `config.json` plus an injected `parameters` count.
//!
//! Resolvers compose: a [`ResolverChain`] tries its members in order and
//! stops at the first success.
//!
//! ```no_run
//! use llm_vram_resolver::{HubConfig, HubResolver, LocalDirResolver, MetadataResolver, ResolverChain};
//!
//! # async fn example() -> Result<(), llm_vram_resolver::ResolverError> {
//! let chain = ResolverChain::new()
//!     .with(LocalDirResolver::new("/models"))
//!     .with(HubResolver::new(HubConfig::default())?);
//! let metadata = chain.resolve("Nexusflow/Starling-LM-7B-beta").await?;
//! assert!(metadata.contains_key("parameters"));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use llm_vram_core::ModelMetadata;
use std::sync::Arc;

pub mod chain;
pub mod error;
pub mod hub;
pub mod local;
pub mod params;
pub mod static_map;

pub use chain::ResolverChain;
pub use error::{ResolverError, Result};
pub use hub::{HubConfig, HubResolver};
pub use local::LocalDirResolver;
pub use params::{ParameterCountStrategy, normalize};
pub use static_map::StaticResolver;

/// Source of model metadata.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Short name used in logs and error reports.
    fn name(&self) -> &str;

    /// Resolve `model_id` to a metadata map that includes `parameters`.
    async fn resolve(&self, model_id: &str) -> Result<ModelMetadata>;
}

#[async_trait]
impl<T: MetadataResolver + ?Sized> MetadataResolver for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn resolve(&self, model_id: &str) -> Result<ModelMetadata> {
        (**self).resolve(model_id).await
    }
}

#[async_trait]
impl<T: MetadataResolver + ?Sized> MetadataResolver for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn resolve(&self, model_id: &str) -> Result<ModelMetadata> {
        (**self).resolve(model_id).await
    }
}
