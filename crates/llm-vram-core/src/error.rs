//! Error types for VRAM estimation.

use thiserror::Error;

/// Fatal errors raised while validating model metadata or a sizing request.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VramError {
    #[error("model metadata is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("invalid sizing request: {0}")]
    InvalidRequest(String),

    /// Only raised when strict quantization names are enabled.
    #[error("unknown quantization scheme '{name}'")]
    UnknownQuantScheme { name: String },
}

impl VramError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue { field, reason: reason.into() }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, VramError>;
