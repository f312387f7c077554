//! Facade error type.

use llm_vram_core::{ConfigError, VramError};
use llm_vram_resolver::ResolverError;
use thiserror::Error;

/// Errors returned by the sizing entry points.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SizingError {
    /// The resolver could not produce metadata. Never retried.
    #[error("metadata unavailable for '{model_id}'")]
    MetadataUnavailable {
        model_id: String,
        #[source]
        source: ResolverError,
    },

    /// Metadata or request failed validation.
    #[error(transparent)]
    Estimation(#[from] VramError),

    #[error("invalid estimator configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("resolver setup failed: {0}")]
    ResolverSetup(#[source] ResolverError),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, SizingError>;
