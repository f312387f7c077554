//! Resolver over model checkouts on disk.

use crate::error::{ResolverError, Result};
use crate::params::{self, ParameterCountStrategy};
use crate::MetadataResolver;
use async_trait::async_trait;
use llm_vram_core::ModelMetadata;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Reads `<root>/<model_id>/config.json` and the weight index files next to it.
///
/// A `parameters` key already present in `config.json` is used as-is, which
/// lets hand-written metadata files stand in for real checkouts.
#[derive(Debug, Clone)]
pub struct LocalDirResolver {
    root: PathBuf,
}

impl LocalDirResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the checkout for `model_id`.
    ///
    /// `None` unless the id is a relative path of plain components, so
    /// lookups never leave `root`.
    pub fn model_dir(&self, model_id: &str) -> Option<PathBuf> {
        let id = Path::new(model_id);
        let mut components = id.components().peekable();
        components.peek()?;
        if components.all(|c| matches!(c, Component::Normal(_))) {
            Some(self.root.join(id))
        } else {
            None
        }
    }

    async fn parameter_count(&self, model_id: &str, dir: &Path) -> Result<u64> {
        let mut attempts = Vec::new();
        for strategy in ParameterCountStrategy::LOCAL_ORDER {
            let Some(file) = strategy.file_name() else { continue };
            let path = dir.join(file);
            match read_json(&path).await {
                Ok(index) => match params::parameters_from_weight_index(&index) {
                    Some(n) => {
                        debug!(%strategy, parameters = n, "parameter count from local index");
                        return Ok(n);
                    }
                    None => attempts.push(format!("{strategy}: no metadata.total_size")),
                },
                Err(e) => attempts.push(format!("{strategy}: {e}")),
            }
        }
        Err(ResolverError::ParameterCountUnavailable { model_id: model_id.to_string(), attempts })
    }
}

#[async_trait]
impl MetadataResolver for LocalDirResolver {
    fn name(&self) -> &str {
        "local"
    }

    async fn resolve(&self, model_id: &str) -> Result<ModelMetadata> {
        let Some(dir) = self.model_dir(model_id) else {
            debug!(model_id, "model id escapes the checkout root");
            return Err(ResolverError::NotFound { model_id: model_id.to_string() });
        };
        let config_path = dir.join("config.json");
        if !tokio::fs::try_exists(&config_path).await.unwrap_or(false) {
            return Err(ResolverError::NotFound { model_id: model_id.to_string() });
        }

        let Value::Object(mut config) = read_json(&config_path).await? else {
            return Err(ResolverError::NotAnObject { model_id: model_id.to_string() });
        };

        let parameters = match params::existing_parameters(&config) {
            Some(n) => n,
            None => self.parameter_count(model_id, &dir).await?,
        };
        params::normalize(&mut config, parameters);
        Ok(config)
    }
}

async fn read_json(path: &Path) -> Result<Value> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ResolverError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes)
        .map_err(|source| ResolverError::Json { what: path.display().to_string(), source })
}
