//! Resolver output feeds straight into descriptor validation.

use llm_vram_core::{ModelDescriptor, VramError};
use llm_vram_resolver::{
    HubConfig, HubResolver, LocalDirResolver, MetadataResolver, ResolverChain, ResolverError,
    StaticResolver,
};
use serde_json::{Value, json};
use std::path::Path;

fn write_checkout(root: &Path, model_id: &str, config: Value, total_size: u64) {
    let dir = root.join(model_id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.json"), serde_json::to_vec(&config).unwrap()).unwrap();
    std::fs::write(
        dir.join("model.safetensors.index.json"),
        serde_json::to_vec(&json!({ "metadata": { "total_size": total_size } })).unwrap(),
    )
    .unwrap();
}

#[tokio::test]
async fn local_checkout_produces_valid_descriptor() {
    let root = tempfile::tempdir().unwrap();
    write_checkout(
        root.path(),
        "Nexusflow/Starling-LM-7B-beta",
        json!({
            "architectures": ["MistralForCausalLM"],
            "hidden_size": 4096,
            "num_attention_heads": 32,
            "num_key_value_heads": 8,
            "num_hidden_layers": 32,
            "torch_dtype": "bfloat16"
        }),
        14_483_464_192,
    );

    let meta = LocalDirResolver::new(root.path())
        .resolve("Nexusflow/Starling-LM-7B-beta")
        .await
        .unwrap();
    let desc = ModelDescriptor::from_metadata(&meta).unwrap();
    assert_eq!(desc.parameters(), 7_241_732_096);
    assert_eq!(desc.gqa_ratio(), 4.0);
}

#[tokio::test]
async fn gpt2_style_config_is_normalized_to_mha() {
    let root = tempfile::tempdir().unwrap();
    write_checkout(
        root.path(),
        "gpt2-ish",
        json!({ "hidden_size": 768, "num_attention_heads": 12, "num_hidden_layers": 12 }),
        248_000_000,
    );

    let meta = LocalDirResolver::new(root.path()).resolve("gpt2-ish").await.unwrap();
    let desc = ModelDescriptor::from_metadata(&meta).unwrap();
    assert!(desc.is_multi_head());
}

#[tokio::test]
async fn missing_layers_surface_as_missing_field() {
    let root = tempfile::tempdir().unwrap();
    write_checkout(
        root.path(),
        "broken",
        json!({ "hidden_size": 768, "num_attention_heads": 12 }),
        2_000,
    );

    let meta = LocalDirResolver::new(root.path()).resolve("broken").await.unwrap();
    assert_eq!(
        ModelDescriptor::from_metadata(&meta).unwrap_err(),
        VramError::MissingField { field: "num_hidden_layers" }
    );
}

#[tokio::test]
async fn chain_falls_through_offline_hub_to_static() {
    let hub = HubResolver::new(HubConfig { offline: true, ..HubConfig::default() }).unwrap();
    let mut pinned = serde_json::Map::new();
    pinned.insert("hidden_size".into(), json!(64));
    let chain = ResolverChain::new()
        .with(hub)
        .with(StaticResolver::new().insert("pinned/model", pinned.clone()));

    assert_eq!(chain.names(), ["hub", "static"]);
    assert_eq!(chain.resolve("pinned/model").await.unwrap(), pinned);
}

#[tokio::test]
async fn chain_error_message_lists_every_attempt() {
    let hub = HubResolver::new(HubConfig { offline: true, ..HubConfig::default() }).unwrap();
    let chain = ResolverChain::new().with(hub).with(StaticResolver::new());
    let err = chain.resolve("a/b").await.unwrap_err();
    assert!(matches!(err, ResolverError::NoStrategySucceeded { .. }));
    insta::assert_snapshot!(err.to_string(), @"no resolver could resolve 'a/b' (tried: hub: cannot fetch metadata for 'a/b' in offline mode (LLM_VRAM_OFFLINE=1); static: no metadata known for model 'a/b')");
}
