//! Resolver-backed sizing entry points.

use crate::error::{Result, SizingError};
use crate::report::{SizingParams, SizingReport};
use llm_vram_core::{EstimatorConfig, ModelDescriptor, estimate_explicit_bpw, estimate_named_quantization};
use llm_vram_resolver::{HubConfig, HubResolver, LocalDirResolver, MetadataResolver, ResolverChain};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Sizes models looked up through a [`MetadataResolver`].
///
/// The calculator holds no mutable state; one instance can serve any number
/// of concurrent requests.
#[derive(Debug)]
pub struct VramCalculator<R> {
    resolver: R,
    config: EstimatorConfig,
}

impl<R: MetadataResolver> VramCalculator<R> {
    /// Calculator with default estimator settings (batch 512, cache 16 bits, 4.5 bpw).
    pub fn new(resolver: R) -> Self {
        Self { resolver, config: EstimatorConfig::default() }
    }

    /// Calculator with explicit estimator settings. The config is validated here
    /// so a bad value fails at construction rather than on the first request.
    pub fn with_config(resolver: R, config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { resolver, config })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolve and validate the architecture of `model_id`.
    #[instrument(skip(self))]
    pub async fn descriptor(&self, model_id: &str) -> Result<ModelDescriptor> {
        let metadata = self.resolver.resolve(model_id).await.map_err(|source| {
            SizingError::MetadataUnavailable { model_id: model_id.to_string(), source }
        })?;
        let model = ModelDescriptor::from_metadata(&metadata)?;
        debug!(?model, "model descriptor");
        Ok(model)
    }

    /// Size `model_id` with weights at an explicit bits-per-weight.
    ///
    /// `cache_bits` and `bits_per_weight` fall back to the configured defaults.
    #[instrument(skip(self))]
    pub async fn size_with_explicit_bpw(
        &self,
        model_id: &str,
        context_length: u64,
        cache_bits: Option<u32>,
        bits_per_weight: Option<f64>,
    ) -> Result<SizingReport> {
        let model = self.descriptor(model_id).await?;
        let estimate =
            estimate_explicit_bpw(&model, context_length, cache_bits, bits_per_weight, &self.config)?;
        let params = SizingParams::ExplicitBpw {
            hf_model: model_id.to_string(),
            context: context_length,
            cache_bit: cache_bits.unwrap_or(self.config.cache_bits),
            bpw: estimate.bits_per_weight,
        };
        Ok(SizingReport::new(params, estimate))
    }

    /// Size `model_id` with weights quantized by the GGUF scheme `quant_scheme`.
    ///
    /// KV cache precision and batch size come from the calculator's
    /// [`EstimatorConfig`] (16 bits and 512 by default). A config with other
    /// values, including one built from `LLM_VRAM_CACHE_BITS` or
    /// `LLM_VRAM_BATCH_SIZE`, changes the context size reported here.
    ///
    /// Unknown names size the weights at zero and carry an
    /// `UnknownQuantScheme` diagnostic unless strict names are configured.
    #[instrument(skip(self))]
    pub async fn size_with_named_quantization(
        &self,
        model_id: &str,
        context_length: u64,
        quant_scheme: &str,
    ) -> Result<SizingReport> {
        let model = self.descriptor(model_id).await?;
        let estimate = estimate_named_quantization(&model, context_length, quant_scheme, &self.config)?;
        let params = SizingParams::NamedQuantization {
            hf_model: model_id.to_string(),
            context: context_length,
            quant_size: quant_scheme.to_string(),
        };
        Ok(SizingReport::new(params, estimate))
    }
}

impl VramCalculator<ResolverChain> {
    /// Hub-backed calculator configured from the environment.
    ///
    /// Reads `LLM_VRAM_*` estimator overrides and `LLM_VRAM_HUB_*` /
    /// `LLM_VRAM_OFFLINE` hub settings.
    pub fn from_env() -> Result<Self> {
        let config = EstimatorConfig::from_env()?;
        let hub = HubConfig::from_env().map_err(SizingError::ResolverSetup)?;
        Self::builder().hub(hub).config(config).build()
    }

    pub fn builder() -> CalculatorBuilder {
        CalculatorBuilder::default()
    }
}

/// Assembles the usual local-checkout → hub resolver chain.
#[derive(Debug, Default)]
pub struct CalculatorBuilder {
    local_dir: Option<PathBuf>,
    hub: Option<HubConfig>,
    config: Option<EstimatorConfig>,
}

impl CalculatorBuilder {
    /// Consult checkouts under `root` before the hub.
    pub fn local_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_dir = Some(root.into());
        self
    }

    pub fn hub(mut self, config: HubConfig) -> Self {
        self.hub = Some(config);
        self
    }

    pub fn config(mut self, config: EstimatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<VramCalculator<ResolverChain>> {
        let mut chain = ResolverChain::new();
        if let Some(root) = self.local_dir {
            chain = chain.with(LocalDirResolver::new(root));
        }
        let hub = HubResolver::new(self.hub.unwrap_or_default()).map_err(SizingError::ResolverSetup)?;
        chain = chain.with(hub);
        VramCalculator::with_config(chain, self.config.unwrap_or_default())
    }
}
