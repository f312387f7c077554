//! HuggingFace Hub resolver.
//!
//! Fetches `config.json` from the hub, then recovers the parameter count
//! through the ordered [`ParameterCountStrategy`] list. Network access needs
//! the `hub` feature; without it every lookup fails with
//! [`ResolverError::FeatureDisabled`].

use crate::error::{ResolverError, Result};
use crate::params::{self, ParameterCountStrategy};
use crate::MetadataResolver;
use async_trait::async_trait;
use llm_vram_core::ModelMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Hub connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL of the hub.
    /// Override: `LLM_VRAM_HUB_ENDPOINT`
    pub endpoint: String,

    /// Git revision files are read from.
    /// Override: `LLM_VRAM_HUB_REVISION`
    pub revision: String,

    /// Per-request timeout in seconds.
    /// Override: `LLM_VRAM_HUB_TIMEOUT_SECS`
    pub timeout_secs: u64,

    pub user_agent: String,

    /// Refuse all network access.
    /// Override: `LLM_VRAM_OFFLINE`
    pub offline: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://huggingface.co".to_string(),
            revision: "main".to_string(),
            timeout_secs: 30,
            user_agent: concat!("llm-vram/", env!("CARGO_PKG_VERSION")).to_string(),
            offline: false,
        }
    }
}

impl HubConfig {
    /// Defaults with `LLM_VRAM_HUB_*` / `LLM_VRAM_OFFLINE` overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("LLM_VRAM_HUB_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("LLM_VRAM_HUB_REVISION") {
            self.revision = val;
        }
        if let Ok(val) = std::env::var("LLM_VRAM_HUB_TIMEOUT_SECS") {
            self.timeout_secs = val.parse().map_err(|e| {
                ResolverError::Config(format!("LLM_VRAM_HUB_TIMEOUT_SECS={val}: {e}"))
            })?;
        }
        if offline_from_env() {
            self.offline = true;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ResolverError::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.revision.is_empty() {
            return Err(ResolverError::Config("revision must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ResolverError::Config("timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

fn offline_from_env() -> bool {
    std::env::var("LLM_VRAM_OFFLINE").as_deref() == Ok("1")
}

/// Resolves model ids against a HuggingFace-compatible hub.
pub struct HubResolver {
    config: HubConfig,
    strategies: Vec<ParameterCountStrategy>,
    #[cfg(feature = "hub")]
    client: reqwest::Client,
}

impl std::fmt::Debug for HubResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubResolver")
            .field("config", &self.config)
            .field("strategies", &self.strategies)
            .finish()
    }
}

impl HubResolver {
    pub fn new(config: HubConfig) -> Result<Self> {
        config.validate()?;

        #[cfg(feature = "hub")]
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResolverError::Config(format!("HTTP client initialization failed: {e}")))?;

        Ok(Self {
            config,
            strategies: ParameterCountStrategy::DEFAULT_ORDER.to_vec(),
            #[cfg(feature = "hub")]
            client,
        })
    }

    /// Replace the parameter-count lookup order.
    pub fn with_strategies(mut self, strategies: Vec<ParameterCountStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn strategies(&self) -> &[ParameterCountStrategy] {
        &self.strategies
    }

    pub fn config_url(&self, model_id: &str) -> String {
        format!(
            "{}/{}/raw/{}/config.json",
            self.config.endpoint.trim_end_matches('/'),
            model_id,
            self.config.revision
        )
    }

    pub fn file_url(&self, model_id: &str, file: &str) -> String {
        format!(
            "{}/{}/resolve/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            model_id,
            self.config.revision,
            file
        )
    }

    pub fn page_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), model_id)
    }

    fn is_offline(&self) -> bool {
        self.config.offline || offline_from_env()
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|source| ResolverError::Json { what: url.to_string(), source })
    }

    #[cfg(feature = "hub")]
    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {url}");
        let http_err = |e: reqwest::Error| ResolverError::Http { url: url.to_string(), reason: e.to_string() };
        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status { url: url.to_string(), status: status.as_u16() });
        }
        response.text().await.map_err(http_err)
    }

    #[cfg(not(feature = "hub"))]
    async fn get_text(&self, _url: &str) -> Result<String> {
        Err(ResolverError::FeatureDisabled)
    }

    async fn parameter_count(&self, model_id: &str) -> Result<u64> {
        let mut attempts = Vec::new();
        for &strategy in &self.strategies {
            match self.try_strategy(model_id, strategy).await {
                Ok(Some(n)) => {
                    info!(%strategy, model_id, parameters = n, "parameter count resolved");
                    return Ok(n);
                }
                Ok(None) => attempts.push(format!("{strategy}: no parameter count")),
                Err(e) => attempts.push(format!("{strategy}: {e}")),
            }
        }
        Err(ResolverError::ParameterCountUnavailable { model_id: model_id.to_string(), attempts })
    }

    async fn try_strategy(
        &self,
        model_id: &str,
        strategy: ParameterCountStrategy,
    ) -> Result<Option<u64>> {
        match strategy.file_name() {
            Some(file) => {
                let index = self.get_json(&self.file_url(model_id, file)).await?;
                Ok(params::parameters_from_weight_index(&index))
            }
            None => {
                let html = self.get_text(&self.page_url(model_id)).await?;
                Ok(params::parameters_from_model_page(&html))
            }
        }
    }
}

#[async_trait]
impl MetadataResolver for HubResolver {
    fn name(&self) -> &str {
        "hub"
    }

    async fn resolve(&self, model_id: &str) -> Result<ModelMetadata> {
        if self.is_offline() {
            return Err(ResolverError::Offline { model_id: model_id.to_string() });
        }

        let Value::Object(mut config) = self.get_json(&self.config_url(model_id)).await? else {
            return Err(ResolverError::NotAnObject { model_id: model_id.to_string() });
        };
        let parameters = self.parameter_count(model_id).await?;
        params::normalize(&mut config, parameters);
        Ok(config)
    }
}
