//! Commands run in-process against on-disk model checkouts.

use clap::Parser;
use llm_vram_cli::{Cli, commands};
use serde_json::{Value, json};
use serial_test::serial;
use std::path::Path;

const ENV_KEYS: [&str; 8] = [
    "LLM_VRAM_BATCH_SIZE",
    "LLM_VRAM_CACHE_BITS",
    "LLM_VRAM_BITS_PER_WEIGHT",
    "LLM_VRAM_STRICT_QUANT",
    "LLM_VRAM_HUB_ENDPOINT",
    "LLM_VRAM_HUB_REVISION",
    "LLM_VRAM_HUB_TIMEOUT_SECS",
    "LLM_VRAM_OFFLINE",
];

fn write_starling(root: &Path) {
    let dir = root.join("Nexusflow/Starling-LM-7B-beta");
    std::fs::create_dir_all(&dir).unwrap();
    let config = json!({
        "architectures": ["MistralForCausalLM"],
        "hidden_size": 4096,
        "num_attention_heads": 32,
        "num_key_value_heads": 8,
        "num_hidden_layers": 32
    });
    std::fs::write(dir.join("config.json"), serde_json::to_vec(&config).unwrap()).unwrap();
    std::fs::write(
        dir.join("model.safetensors.index.json"),
        br#"{ "metadata": { "total_size": 14483464192 } }"#,
    )
    .unwrap();
}

/// Run `args` with a clean `LLM_VRAM_*` environment plus `vars`.
fn run_with(args: &[&str], vars: &[(&str, &str)]) -> anyhow::Result<String> {
    let mut env: Vec<(&str, Option<&str>)> = ENV_KEYS.iter().map(|k| (*k, None)).collect();
    env.extend(vars.iter().map(|(k, v)| (*k, Some(*v))));
    let cli = Cli::try_parse_from(std::iter::once("llm-vram").chain(args.iter().copied()))?;
    temp_env::with_vars(env, || -> anyhow::Result<String> {
        let rt = tokio::runtime::Runtime::new()?;
        let mut out = Vec::new();
        rt.block_on(commands::run(&cli, &mut out))?;
        Ok(String::from_utf8(out)?)
    })
}

#[test]
#[serial(llm_vram_env)]
fn gguf_json_from_local_checkout() {
    let root = tempfile::tempdir().unwrap();
    write_starling(root.path());
    let dir = root.path().to_str().unwrap();

    let out = run_with(
        &["--offline", "--local-dir", dir, "--format", "json", "gguf",
          "--model", "Nexusflow/Starling-LM-7B-beta", "--context", "8192", "--quant", "Q4_K_S"],
        &[],
    )
    .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        value["params"],
        json!({ "hf_model": "Nexusflow/Starling-LM-7B-beta", "context": 8192, "quant_size": "Q4_K_S" })
    );
    assert!((value["total_size"].as_f64().unwrap() - 5.390477132797241).abs() < 1e-9);
}

#[test]
#[serial(llm_vram_env)]
fn exl2_text_output() {
    let root = tempfile::tempdir().unwrap();
    write_starling(root.path());
    let dir = root.path().to_str().unwrap();

    let out = run_with(
        &["--offline", "--local-dir", dir, "exl2", "-m", "Nexusflow/Starling-LM-7B-beta", "-n", "8192"],
        &[],
    )
    .unwrap();
    let out = console::strip_ansi_codes(&out);
    assert!(out.contains("4.5 bpw, 16-bit cache"));
    assert!(out.contains("    3.79 GiB"));
    assert!(out.contains("    5.32 GiB"));
}

#[test]
#[serial(llm_vram_env)]
fn env_override_changes_default_bpw() {
    let root = tempfile::tempdir().unwrap();
    write_starling(root.path());
    let dir = root.path().to_str().unwrap();

    let out = run_with(
        &["--offline", "--local-dir", dir, "--format", "json", "exl2",
          "-m", "Nexusflow/Starling-LM-7B-beta", "-n", "8192"],
        &[("LLM_VRAM_BITS_PER_WEIGHT", "8.0")],
    )
    .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["params"]["bpw"], 8.0);
}

#[test]
#[serial(llm_vram_env)]
fn unknown_quant_is_reported_not_fatal() {
    let root = tempfile::tempdir().unwrap();
    write_starling(root.path());
    let dir = root.path().to_str().unwrap();

    let out = run_with(
        &["--offline", "--local-dir", dir, "--format", "json", "gguf",
          "-m", "Nexusflow/Starling-LM-7B-beta", "-n", "1024", "-q", "Q4_K_XL"],
        &[],
    )
    .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["model_size"], 0.0);
    assert_eq!(value["diagnostics"][0]["kind"], "unknown_quant_scheme");
}

#[test]
#[serial(llm_vram_env)]
fn strict_config_file_makes_unknown_quant_fatal() {
    let root = tempfile::tempdir().unwrap();
    write_starling(root.path());
    let config = root.path().join("llm-vram.toml");
    std::fs::write(&config, "strict_quant_names = true\n").unwrap();

    let err = run_with(
        &["--offline", "--local-dir", root.path().to_str().unwrap(), "--config", config.to_str().unwrap(),
          "gguf", "-m", "Nexusflow/Starling-LM-7B-beta", "-n", "1024", "-q", "Q4_K_XL"],
        &[],
    )
    .unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("failed to size Nexusflow/Starling-LM-7B-beta"));
    assert!(chain.contains("Q4_K_XL"));
}

#[test]
#[serial(llm_vram_env)]
fn offline_unknown_model_fails_with_context() {
    let root = tempfile::tempdir().unwrap();
    let err = run_with(
        &["--offline", "--local-dir", root.path().to_str().unwrap(), "gguf", "-m", "x/y", "-n", "1024"],
        &[],
    )
    .unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("failed to size x/y"));
    assert!(chain.contains("offline"));
}

#[test]
#[serial(llm_vram_env)]
fn config_show_reflects_flags_and_env() {
    let out = run_with(&["--offline", "config", "show"], &[("LLM_VRAM_CACHE_BITS", "8")]).unwrap();
    insta::assert_snapshot!(out, @r#"
    [estimator]
    batch_size = 512
    cache_bits = 8
    bits_per_weight = 4.5
    strict_quant_names = false

    [hub]
    endpoint = "https://huggingface.co"
    revision = "main"
    timeout_secs = 30
    user_agent = "llm-vram/0.1.0"
    offline = true
    "#);
}

#[test]
#[serial(llm_vram_env)]
fn missing_config_file_is_an_error() {
    let err = run_with(&["--config", "/nonexistent/llm-vram.toml", "config", "show"], &[]).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load config from /nonexistent/llm-vram.toml"));
}

#[test]
#[serial(llm_vram_env)]
fn env_override_wins_over_config_file() {
    let root = tempfile::tempdir().unwrap();
    let config = root.path().join("llm-vram.toml");
    std::fs::write(&config, "cache_bits = 4\nbatch_size = 256\n").unwrap();

    let out = run_with(
        &["--config", config.to_str().unwrap(), "--format", "json", "config", "show"],
        &[("LLM_VRAM_CACHE_BITS", "8")],
    )
    .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["estimator"]["cache_bits"], 8);
    assert_eq!(value["estimator"]["batch_size"], 256);
}

#[test]
#[serial(llm_vram_env)]
fn bad_env_override_names_the_config_file() {
    let root = tempfile::tempdir().unwrap();
    let config = root.path().join("llm-vram.toml");
    std::fs::write(&config, "cache_bits = 4\n").unwrap();

    let err = run_with(
        &["--config", config.to_str().unwrap(), "config", "show"],
        &[("LLM_VRAM_BATCH_SIZE", "lots")],
    )
    .unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("failed to load config from"));
    assert!(chain.contains("LLM_VRAM_BATCH_SIZE=lots"));
}
