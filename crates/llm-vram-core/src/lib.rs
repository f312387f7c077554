//! VRAM estimation engine for transformer LLM inference.
//!
//! Converts a model's architecture (hidden size, layers, attention heads,
//! parameter count) and runtime parameters (context length, batch size, KV
//! cache precision, weight quantization) into the memory a llama.cpp style
//! runtime needs: quantized weights plus input buffers, compute scratch and
//! KV cache for the context window.
//!
//! Everything here is pure and synchronous. Fetching model metadata is the
//! job of a resolver (see the `llm-vram-resolver` crate); this crate only
//! validates the flat metadata map it receives.
//!
//! # Example
//!
//! ```
//! use llm_vram_core::{EstimatorConfig, ModelDescriptor, estimate_named_quantization};
//!
//! let model = ModelDescriptor::new(4096, 32, 8, 32, 7_241_732_096)?;
//! let est = estimate_named_quantization(&model, 8192, "Q4_K_S", &EstimatorConfig::default())?;
//! assert!(est.sizes.fits_in(6.0));
//! # Ok::<(), llm_vram_core::VramError>(())
//! ```

pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod estimate;

pub use config::{ConfigError, DEFAULT_BITS_PER_WEIGHT, DEFAULT_CACHE_BITS, EstimatorConfig};
pub use descriptor::{ModelDescriptor, ModelMetadata, fields};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use engine::{
    BYTES_PER_GIB, REFERENCE_BATCH_SIZE, bytes_to_gib, compute_buffer, context_size,
    input_buffer, kv_cache, model_weight_size,
};
pub use error::{Result, VramError};
pub use estimate::{
    Estimate, SizingRequest, SizingResult, estimate, estimate_explicit_bpw,
    estimate_named_quantization,
};
