//! Model / context / total sizing.
//!
//! Composes the per-region formulas from [`crate::engine`] into the three
//! figures capacity planners ask for, in GiB.

use crate::config::EstimatorConfig;
use crate::descriptor::ModelDescriptor;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::engine::{bytes_to_gib, context_size, model_weight_size};
use crate::error::{Result, VramError};
use serde::{Deserialize, Serialize};

/// Memory needed to serve a model, in GiB.
///
/// `total_size` is always exactly `model_size + context_size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub model_size: f64,
    pub context_size: f64,
    pub total_size: f64,
}

impl SizingResult {
    /// Convert the two byte counts to GiB and sum them.
    pub fn from_bytes(model_bytes: f64, context_bytes: f64) -> Self {
        let model_size = bytes_to_gib(model_bytes);
        let context_size = bytes_to_gib(context_bytes);
        Self { model_size, context_size, total_size: model_size + context_size }
    }

    /// `true` when the total fits in `vram_gib`.
    pub fn fits_in(&self, vram_gib: f64) -> bool {
        self.total_size <= vram_gib
    }
}

/// Runtime parameters of one sizing computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingRequest {
    pub context_length: u64,
    pub batch_size: u64,
    pub cache_bits: u32,
    pub bits_per_weight: f64,
}

impl SizingRequest {
    /// Reject requests the formulas cannot size meaningfully.
    ///
    /// A bpw of zero is allowed, it is what an unknown scheme name sizes at.
    pub fn validate(&self) -> Result<()> {
        if self.context_length == 0 {
            return Err(VramError::InvalidRequest("context_length must be > 0".into()));
        }
        if self.batch_size == 0 {
            return Err(VramError::InvalidRequest("batch_size must be > 0".into()));
        }
        if self.cache_bits == 0 {
            return Err(VramError::InvalidRequest("cache_bits must be > 0".into()));
        }
        if !self.bits_per_weight.is_finite() || self.bits_per_weight < 0.0 {
            return Err(VramError::InvalidRequest(format!(
                "bits_per_weight must be a finite non-negative number, got {}",
                self.bits_per_weight
            )));
        }
        Ok(())
    }
}

/// Result of one sizing computation plus the diagnostics it raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    #[serde(flatten)]
    pub sizes: SizingResult,
    pub bits_per_weight: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Estimate {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Size `model` for `request`.
pub fn estimate(model: &ModelDescriptor, request: &SizingRequest) -> Result<Estimate> {
    let mut diagnostics = Diagnostics::new();
    estimate_with(model, request, &mut diagnostics)
}

fn estimate_with(
    model: &ModelDescriptor,
    request: &SizingRequest,
    diagnostics: &mut Diagnostics,
) -> Result<Estimate> {
    request.validate()?;

    let model_bytes = model_weight_size(model, request.bits_per_weight);
    let context_bytes = context_size(
        request.context_length,
        model,
        request.batch_size,
        request.cache_bits,
        diagnostics,
    );
    let sizes = SizingResult::from_bytes(model_bytes, context_bytes);
    tracing::debug!(
        model_bytes,
        context_bytes,
        total_gib = sizes.total_size,
        "sized model"
    );

    Ok(Estimate {
        sizes,
        bits_per_weight: request.bits_per_weight,
        diagnostics: std::mem::take(diagnostics).into_vec(),
    })
}

/// Size externally quantized (EXL2-style) weights at an arbitrary bpw.
///
/// `cache_bits` and `bits_per_weight` fall back to `config`.
pub fn estimate_explicit_bpw(
    model: &ModelDescriptor,
    context_length: u64,
    cache_bits: Option<u32>,
    bits_per_weight: Option<f64>,
    config: &EstimatorConfig,
) -> Result<Estimate> {
    let request = SizingRequest {
        context_length,
        batch_size: config.batch_size,
        cache_bits: cache_bits.unwrap_or(config.cache_bits),
        bits_per_weight: bits_per_weight.unwrap_or(config.bits_per_weight),
    };
    estimate(model, &request)
}

/// Size GGUF weights quantized with a named scheme.
///
/// Cache bits and batch size are taken from `config`.
///
/// An unknown name sizes the weights at 0 bpw (model size 0) and raises
/// [`Diagnostic::UnknownQuantScheme`]; callers relying on the model size must
/// check the diagnostics. With [`EstimatorConfig::strict_quant_names`] the
/// name is rejected instead.
pub fn estimate_named_quantization(
    model: &ModelDescriptor,
    context_length: u64,
    quant_scheme: &str,
    config: &EstimatorConfig,
) -> Result<Estimate> {
    let mut diagnostics = Diagnostics::new();
    let bits_per_weight = match llm_vram_quant::bits_per_weight(quant_scheme) {
        Some(bpw) => bpw,
        None if config.strict_quant_names => {
            return Err(VramError::UnknownQuantScheme { name: quant_scheme.to_string() });
        }
        None => {
            diagnostics.raise(Diagnostic::UnknownQuantScheme { name: quant_scheme.to_string() });
            0.0
        }
    };

    let request = SizingRequest {
        context_length,
        batch_size: config.batch_size,
        cache_bits: config.cache_bits,
        bits_per_weight,
    };
    estimate_with(model, &request, &mut diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starling() -> ModelDescriptor {
        ModelDescriptor::new(4096, 32, 8, 32, 7_241_732_096).unwrap()
    }

    #[test]
    fn from_bytes_total_is_exact_sum() {
        let r = SizingResult::from_bytes(4_073_474_304.0, 1_642_079_744.0);
        assert_eq!(r.total_size, r.model_size + r.context_size);
    }

    #[test]
    fn fits_in_compares_total() {
        let r = SizingResult { model_size: 3.0, context_size: 1.0, total_size: 4.0 };
        assert!(r.fits_in(4.0));
        assert!(!r.fits_in(3.99));
    }

    #[test]
    fn request_validation() {
        let ok = SizingRequest {
            context_length: 1,
            batch_size: 1,
            cache_bits: 16,
            bits_per_weight: 0.0,
        };
        assert!(ok.validate().is_ok());
        for bad in [
            SizingRequest { context_length: 0, ..ok },
            SizingRequest { batch_size: 0, ..ok },
            SizingRequest { cache_bits: 0, ..ok },
            SizingRequest { bits_per_weight: -0.5, ..ok },
            SizingRequest { bits_per_weight: f64::NAN, ..ok },
        ] {
            assert!(matches!(bad.validate(), Err(VramError::InvalidRequest(_))), "{bad:?}");
        }
    }

    #[test]
    fn explicit_bpw_uses_config_defaults() {
        let cfg = EstimatorConfig::default();
        let a = estimate_explicit_bpw(&starling(), 8192, None, None, &cfg).unwrap();
        let b = estimate_explicit_bpw(&starling(), 8192, Some(16), Some(4.5), &cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bits_per_weight, 4.5);
        assert!(!a.has_diagnostics());
    }

    #[test]
    fn named_unknown_scheme_degrades_to_zero() {
        let cfg = EstimatorConfig::default();
        let est = estimate_named_quantization(&starling(), 8192, "", &cfg).unwrap();
        assert_eq!(est.sizes.model_size, 0.0);
        assert_eq!(est.sizes.total_size, est.sizes.context_size);
        assert_eq!(est.diagnostics, vec![Diagnostic::UnknownQuantScheme { name: String::new() }]);
    }

    #[test]
    fn named_unknown_scheme_strict_mode_fails() {
        let cfg = EstimatorConfig { strict_quant_names: true, ..EstimatorConfig::default() };
        let err = estimate_named_quantization(&starling(), 8192, "Q4_K_XL", &cfg).unwrap_err();
        assert_eq!(err, VramError::UnknownQuantScheme { name: "Q4_K_XL".into() });
    }

    #[test]
    fn named_known_scheme_in_strict_mode_succeeds() {
        let cfg = EstimatorConfig { strict_quant_names: true, ..EstimatorConfig::default() };
        let est = estimate_named_quantization(&starling(), 8192, "Q8_0", &cfg).unwrap();
        assert_eq!(est.bits_per_weight, 8.5);
    }

    #[test]
    fn batch_diagnostic_and_unknown_scheme_accumulate() {
        let cfg = EstimatorConfig { batch_size: 32, ..EstimatorConfig::default() };
        let est = estimate_named_quantization(&starling(), 512, "nope", &cfg).unwrap();
        let keys: Vec<_> = est.diagnostics.iter().map(Diagnostic::key).collect();
        assert_eq!(keys, ["unknown_quant_scheme", "non_standard_batch_size"]);
    }

    #[test]
    fn zero_context_is_rejected() {
        let cfg = EstimatorConfig::default();
        assert!(matches!(
            estimate_explicit_bpw(&starling(), 0, None, None, &cfg),
            Err(VramError::InvalidRequest(_))
        ));
    }

    #[test]
    fn estimate_serializes_flat() {
        let est = estimate_explicit_bpw(&starling(), 8192, None, None, &EstimatorConfig::default())
            .unwrap();
        let json = serde_json::to_value(&est).unwrap();
        assert!(json.get("model_size").is_some());
        assert!(json.get("total_size").is_some());
        assert!(json.get("diagnostics").is_none());
    }
}
