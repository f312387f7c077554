//! Serializable sizing reports.

use llm_vram_core::{Diagnostic, Estimate, SizingResult};
use serde::{Deserialize, Serialize};

/// Request parameters echoed back in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizingParams {
    /// Externally quantized weights at an explicit bpw.
    ExplicitBpw {
        hf_model: String,
        context: u64,
        cache_bit: u32,
        bpw: f64,
    },
    /// GGUF weights quantized with a named scheme.
    NamedQuantization {
        hf_model: String,
        context: u64,
        quant_size: String,
    },
}

impl SizingParams {
    pub fn model_id(&self) -> &str {
        match self {
            Self::ExplicitBpw { hf_model, .. } | Self::NamedQuantization { hf_model, .. } => hf_model,
        }
    }

    pub fn context_length(&self) -> u64 {
        match self {
            Self::ExplicitBpw { context, .. } | Self::NamedQuantization { context, .. } => *context,
        }
    }
}

/// Sizes in GiB plus the request that produced them.
///
/// Serializes to the flat `{ "params": .., "model_size": .., "context_size": ..,
/// "total_size": .. }` shape; `diagnostics` only appears when non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingReport {
    pub params: SizingParams,
    #[serde(flatten)]
    pub sizes: SizingResult,
    #[serde(skip)]
    pub bits_per_weight: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl SizingReport {
    pub(crate) fn new(params: SizingParams, estimate: Estimate) -> Self {
        Self {
            params,
            sizes: estimate.sizes,
            bits_per_weight: estimate.bits_per_weight,
            diagnostics: estimate.diagnostics,
        }
    }

    pub fn model_size(&self) -> f64 {
        self.sizes.model_size
    }

    pub fn context_size(&self) -> f64 {
        self.sizes.context_size
    }

    pub fn total_size(&self) -> f64 {
        self.sizes.total_size
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
