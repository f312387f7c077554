//! Estimator configuration.
//!
//! Loads [`EstimatorConfig`] from a TOML file (`llm-vram.toml`) with
//! environment variable overrides via `LLM_VRAM_*` prefixed variables.

use crate::engine::REFERENCE_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default KV cache precision in bits.
pub const DEFAULT_CACHE_BITS: u32 = 16;
/// Default bits per weight for externally quantized (EXL2) weights.
pub const DEFAULT_BITS_PER_WEIGHT: f64 = 4.5;

/// Runtime parameters the sizing entry points fall back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Batch size used for input and compute buffers.
    /// Override: `LLM_VRAM_BATCH_SIZE`
    pub batch_size: u64,

    /// KV cache precision in bits.
    /// Override: `LLM_VRAM_CACHE_BITS`
    pub cache_bits: u32,

    /// Bits per weight when none is given explicitly.
    /// Override: `LLM_VRAM_BITS_PER_WEIGHT`
    pub bits_per_weight: f64,

    /// Reject unknown quantization scheme names instead of sizing them at 0 bpw.
    /// Override: `LLM_VRAM_STRICT_QUANT`
    pub strict_quant_names: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            batch_size: REFERENCE_BATCH_SIZE,
            cache_bits: DEFAULT_CACHE_BITS,
            bits_per_weight: DEFAULT_BITS_PER_WEIGHT,
            strict_quant_names: false,
        }
    }
}

/// Errors that can occur when loading or validating an [`EstimatorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid environment override {key}={value}: {reason}")]
    EnvOverride { key: String, value: String, reason: String },
}

impl EstimatorConfig {
    /// Render the default configuration as TOML.
    pub fn default_toml() -> String {
        // A flat struct of scalars always serializes.
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields, then apply environment variable overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut cfg: EstimatorConfig = toml::from_str(toml_str)?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load only from environment variables, starting from defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Validation("batch_size must be > 0".into()));
        }
        if self.cache_bits == 0 || self.cache_bits > 32 {
            return Err(ConfigError::Validation(format!(
                "cache_bits must be in 1..=32, got {}",
                self.cache_bits
            )));
        }
        if !self.bits_per_weight.is_finite()
            || self.bits_per_weight <= 0.0
            || self.bits_per_weight > 32.0
        {
            return Err(ConfigError::Validation(format!(
                "bits_per_weight must be in (0, 32], got {}",
                self.bits_per_weight
            )));
        }
        Ok(())
    }

    /// Apply `LLM_VRAM_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("LLM_VRAM_BATCH_SIZE") {
            self.batch_size = val.parse::<u64>().map_err(|e| ConfigError::EnvOverride {
                key: "LLM_VRAM_BATCH_SIZE".into(),
                value: val.clone(),
                reason: e.to_string(),
            })?;
        }

        if let Ok(val) = std::env::var("LLM_VRAM_CACHE_BITS") {
            self.cache_bits = val.parse::<u32>().map_err(|e| ConfigError::EnvOverride {
                key: "LLM_VRAM_CACHE_BITS".into(),
                value: val.clone(),
                reason: e.to_string(),
            })?;
        }

        if let Ok(val) = std::env::var("LLM_VRAM_BITS_PER_WEIGHT") {
            self.bits_per_weight = val.parse::<f64>().map_err(|e| ConfigError::EnvOverride {
                key: "LLM_VRAM_BITS_PER_WEIGHT".into(),
                value: val.clone(),
                reason: e.to_string(),
            })?;
        }

        if let Ok(val) = std::env::var("LLM_VRAM_STRICT_QUANT") {
            self.strict_quant_names = matches!(val.as_str(), "1" | "true" | "yes");
        }

        Ok(())
    }
}
