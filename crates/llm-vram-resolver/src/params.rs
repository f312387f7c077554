//! Parameter-count discovery and config normalization.
//!
//! Registry configs carry the architecture but not the parameter count. The
//! count is recovered, in order of preference, from the safetensors weight
//! index, the PyTorch weight index, or the model page HTML.

use llm_vram_core::{ModelMetadata, fields};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Where a parameter count can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterCountStrategy {
    /// `model.safetensors.index.json`, `metadata.total_size` / 2.
    SafetensorsIndex,
    /// `pytorch_model.bin.index.json`, `metadata.total_size` / 2.
    PytorchIndex,
    /// Parameter widget embedded in the model's hub page.
    ModelPage,
}

impl ParameterCountStrategy {
    /// Hub lookup order.
    pub const DEFAULT_ORDER: [Self; 3] = [Self::SafetensorsIndex, Self::PytorchIndex, Self::ModelPage];

    /// Strategies that work against a local checkout.
    pub const LOCAL_ORDER: [Self; 2] = [Self::SafetensorsIndex, Self::PytorchIndex];

    pub const fn name(self) -> &'static str {
        match self {
            Self::SafetensorsIndex => "safetensors-index",
            Self::PytorchIndex => "pytorch-index",
            Self::ModelPage => "model-page",
        }
    }

    /// Repository file the strategy reads, if it reads one.
    pub const fn file_name(self) -> Option<&'static str> {
        match self {
            Self::SafetensorsIndex => Some("model.safetensors.index.json"),
            Self::PytorchIndex => Some("pytorch_model.bin.index.json"),
            Self::ModelPage => None,
        }
    }
}

impl std::fmt::Display for ParameterCountStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter count from a sharded-checkpoint weight index.
///
/// Index sizes are in bytes of an fp16/bf16 checkpoint, two bytes per
/// parameter. Zero or missing sizes yield `None`.
pub fn parameters_from_weight_index(index: &Value) -> Option<u64> {
    let total = index.pointer("/metadata/total_size")?;
    let bytes = total
        .as_u64()
        .or_else(|| total.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))?;
    Some(bytes / 2).filter(|&n| n > 0)
}

/// Parameter count scraped from a model page.
///
/// Looks for the `ModelSafetensorsParams` widget first and the
/// `ModelHeader` widget second; both embed JSON in an HTML-escaped
/// `data-props` attribute.
pub fn parameters_from_model_page(html: &str) -> Option<u64> {
    const WIDGETS: [(&str, &str); 2] = [
        ("ModelSafetensorsParams", "/safetensors/total"),
        ("ModelHeader", "/model/safetensors/total"),
    ];

    WIDGETS.iter().find_map(|(target, pointer)| {
        let props = widget_props(html, target)?;
        props.pointer(pointer)?.as_u64().filter(|&n| n > 0)
    })
}

fn widget_props(html: &str, target: &str) -> Option<Value> {
    static TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();
    static ATTR_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"<div\b[^>]*>").ok()).as_ref()?;
    let attr_re = ATTR_RE
        .get_or_init(|| Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*"([^"]*)""#).ok())
        .as_ref()?;

    tag_re.find_iter(html).find_map(|tag| {
        let mut is_target = false;
        let mut props = None;
        for caps in attr_re.captures_iter(tag.as_str()) {
            match &caps[1] {
                "data-target" => is_target = &caps[2] == target,
                "data-props" => props = Some(caps[2].to_string()),
                _ => {}
            }
        }
        if !is_target {
            return None;
        }
        serde_json::from_str(&unescape_html(&props?)).ok()
    })
}

fn unescape_html(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Inject `parameters` and fill in KV heads for plain multi-head configs.
///
/// Configs without `num_key_value_heads` (GPT-2, early LLaMA exports) use one
/// KV head per attention head. Other missing fields are left for descriptor
/// validation to reject.
pub fn normalize(config: &mut ModelMetadata, parameters: u64) {
    config.insert(fields::PARAMETERS.to_string(), Value::from(parameters));

    if !matches!(config.get(fields::NUM_KEY_VALUE_HEADS), None | Some(Value::Null)) {
        return;
    }
    if let Some(heads) = config.get(fields::NUM_ATTENTION_HEADS).cloned() {
        tracing::debug!("num_key_value_heads missing, assuming multi-head attention");
        config.insert(fields::NUM_KEY_VALUE_HEADS.to_string(), heads);
    }
}

/// Parameter count already present in a hand-written metadata file.
pub(crate) fn existing_parameters(config: &ModelMetadata) -> Option<u64> {
    config.get(fields::PARAMETERS)?.as_u64().filter(|&n| n > 0)
}
