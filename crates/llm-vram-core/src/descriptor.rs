//! Model architecture descriptor.
//!
//! A [`ModelDescriptor`] is the validated view of the flat metadata map a
//! resolver produces (a HuggingFace `config.json` plus an injected parameter
//! count). Only the fields the estimator reads are kept.

use crate::error::{Result, VramError};
use serde::Serialize;
use serde_json::Value;

/// Flat model metadata as handed over by a resolver.
pub type ModelMetadata = serde_json::Map<String, Value>;

/// Metadata keys read by the estimator.
pub mod fields {
    pub const HIDDEN_SIZE: &str = "hidden_size";
    pub const NUM_ATTENTION_HEADS: &str = "num_attention_heads";
    pub const NUM_KEY_VALUE_HEADS: &str = "num_key_value_heads";
    pub const NUM_HIDDEN_LAYERS: &str = "num_hidden_layers";
    pub const PARAMETERS: &str = "parameters";

    /// Every required key, in validation order.
    pub const REQUIRED: [&str; 5] =
        [HIDDEN_SIZE, NUM_ATTENTION_HEADS, NUM_KEY_VALUE_HEADS, NUM_HIDDEN_LAYERS, PARAMETERS];
}

/// Validated transformer architecture.
///
/// All counts are positive and `num_attention_heads` is a multiple of
/// `num_key_value_heads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    hidden_size: u64,
    num_attention_heads: u64,
    num_key_value_heads: u64,
    num_hidden_layers: u64,
    parameters: u64,
}

impl ModelDescriptor {
    /// Build a descriptor from explicit counts.
    pub fn new(
        hidden_size: u64,
        num_attention_heads: u64,
        num_key_value_heads: u64,
        num_hidden_layers: u64,
        parameters: u64,
    ) -> Result<Self> {
        let checks = [
            (fields::HIDDEN_SIZE, hidden_size),
            (fields::NUM_ATTENTION_HEADS, num_attention_heads),
            (fields::NUM_KEY_VALUE_HEADS, num_key_value_heads),
            (fields::NUM_HIDDEN_LAYERS, num_hidden_layers),
            (fields::PARAMETERS, parameters),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(VramError::invalid(field, "must be > 0, got 0"));
            }
        }
        if num_attention_heads % num_key_value_heads != 0 {
            return Err(VramError::invalid(
                fields::NUM_KEY_VALUE_HEADS,
                format!(
                    "num_attention_heads ({num_attention_heads}) is not a multiple of \
                     num_key_value_heads ({num_key_value_heads})"
                ),
            ));
        }

        Ok(Self {
            hidden_size,
            num_attention_heads,
            num_key_value_heads,
            num_hidden_layers,
            parameters,
        })
    }

    /// Validate resolver metadata.
    ///
    /// A key that is absent or `null` is a [`VramError::MissingField`]; a value
    /// that is not a positive whole number is a [`VramError::InvalidValue`].
    /// Extra keys are ignored.
    pub fn from_metadata(metadata: &ModelMetadata) -> Result<Self> {
        Self::new(
            required_count(metadata, fields::HIDDEN_SIZE)?,
            required_count(metadata, fields::NUM_ATTENTION_HEADS)?,
            required_count(metadata, fields::NUM_KEY_VALUE_HEADS)?,
            required_count(metadata, fields::NUM_HIDDEN_LAYERS)?,
            required_count(metadata, fields::PARAMETERS)?,
        )
    }

    pub fn hidden_size(&self) -> u64 {
        self.hidden_size
    }

    pub fn num_attention_heads(&self) -> u64 {
        self.num_attention_heads
    }

    pub fn num_key_value_heads(&self) -> u64 {
        self.num_key_value_heads
    }

    pub fn num_hidden_layers(&self) -> u64 {
        self.num_hidden_layers
    }

    pub fn parameters(&self) -> u64 {
        self.parameters
    }

    /// Query heads per key/value head, as a float.
    pub fn gqa_ratio(&self) -> f64 {
        self.num_attention_heads as f64 / self.num_key_value_heads as f64
    }

    /// `true` for plain multi-head attention (one KV head per query head).
    pub fn is_multi_head(&self) -> bool {
        self.num_attention_heads == self.num_key_value_heads
    }
}

impl TryFrom<&ModelMetadata> for ModelDescriptor {
    type Error = VramError;

    fn try_from(metadata: &ModelMetadata) -> Result<Self> {
        Self::from_metadata(metadata)
    }
}

fn required_count(metadata: &ModelMetadata, field: &'static str) -> Result<u64> {
    let value = match metadata.get(field) {
        None | Some(Value::Null) => return Err(VramError::MissingField { field }),
        Some(v) => v,
    };

    let Value::Number(number) = value else {
        return Err(VramError::invalid(field, format!("expected a positive integer, got {value}")));
    };

    if let Some(n) = number.as_u64() {
        return if n > 0 { Ok(n) } else { Err(VramError::invalid(field, "must be > 0, got 0")) };
    }

    // Whole floats (`7241732096.0`) are accepted, resolvers derive counts by division.
    match number.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Ok(f as u64)
        }
        _ => Err(VramError::invalid(field, format!("expected a positive integer, got {number}"))),
    }
}
