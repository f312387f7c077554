//! Estimate the GPU memory needed to serve a transformer LLM.
//!
//! This crate ties the pieces together: a [`MetadataResolver`] looks up the
//! model's architecture, the core engine sizes the quantized weights and the
//! context window, and the result comes back as a [`SizingReport`] in GiB.
//!
//! ```no_run
//! use llm_vram::VramCalculator;
//!
//! # async fn example() -> Result<(), llm_vram::SizingError> {
//! let calc = VramCalculator::from_env()?;
//! let report = calc
//!     .size_with_named_quantization("Nexusflow/Starling-LM-7B-beta", 8192, "Q4_K_S")
//!     .await?;
//! println!("{:.2} GiB", report.total_size());
//! # Ok(())
//! # }
//! ```

pub mod calculator;
pub mod error;
pub mod report;

pub use calculator::{CalculatorBuilder, VramCalculator};
pub use error::{Result, SizingError};
pub use report::{SizingParams, SizingReport};

pub use llm_vram_core::{
    Diagnostic, EstimatorConfig, ModelDescriptor, ModelMetadata, SizingResult, VramError,
};
pub use llm_vram_quant::QuantScheme;
pub use llm_vram_resolver::{
    HubConfig, HubResolver, LocalDirResolver, MetadataResolver, ResolverChain, ResolverError,
    StaticResolver,
};

/// GGUF quantization scheme names, in table order.
pub fn list_quantization_schemes() -> &'static [&'static str] {
    llm_vram_quant::scheme_names()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemes_in_table_order() {
        let names = list_quantization_schemes();
        assert_eq!(names.len(), 12);
        assert_eq!(names.first(), Some(&"Q2_K"));
        assert_eq!(names.last(), Some(&"Q8_0"));
    }
}
