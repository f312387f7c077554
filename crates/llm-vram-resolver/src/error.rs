//! Resolver error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving model metadata.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("HTTP request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed JSON in {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no metadata known for model '{model_id}'")]
    NotFound { model_id: String },

    #[error("config for '{model_id}' is not a JSON object")]
    NotAnObject { model_id: String },

    #[error("cannot fetch metadata for '{model_id}' in offline mode (LLM_VRAM_OFFLINE=1)")]
    Offline { model_id: String },

    #[error("network access disabled: build with --features hub")]
    FeatureDisabled,

    #[error("no parameter count found for '{model_id}' (tried: {})", attempts.join("; "))]
    ParameterCountUnavailable { model_id: String, attempts: Vec<String> },

    #[error("no resolver could resolve '{model_id}' (tried: {})", attempts.join("; "))]
    NoStrategySucceeded { model_id: String, attempts: Vec<String> },

    #[error("invalid hub configuration: {0}")]
    Config(String),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, ResolverError>;
