//! llm-vram CLI library
//!
//! Argument definitions and command handlers, exposed so the parser can be
//! tested without spawning the binary.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod logging;
pub mod output;

pub use output::OutputFormat;

/// llm-vram - estimate GPU memory for serving transformer LLMs
#[derive(Debug, Parser)]
#[command(name = "llm-vram")]
#[command(about = "Estimate the VRAM needed to serve a transformer LLM")]
#[command(long_about = r#"
Estimates the GPU memory a llama.cpp style runtime needs for a model: the
quantized weights plus input buffers, compute scratch and KV cache for the
requested context window.

Examples:
  # EXL2 weights at 4.5 bits per weight, fp16 KV cache
  llm-vram exl2 --model Nexusflow/Starling-LM-7B-beta --context 8192 --bpw 4.5

  # GGUF weights with a named quantization
  llm-vram gguf --model Nexusflow/Starling-LM-7B-beta --context 8192 --quant Q4_K_S

  # Use local checkouts before the hub, machine-readable output
  llm-vram --local-dir ~/models --format json gguf --model org/model --context 4096

  # Known GGUF quantization schemes
  llm-vram quants
"#)]
#[command(version)]
pub struct Cli {
    /// Estimator configuration file (TOML)
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL", global = true, default_value = "warn")]
    pub log_level: String,

    /// Log format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT", global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory of model checkouts consulted before the hub
    #[arg(long, value_name = "DIR", global = true, env = "LLM_VRAM_LOCAL_DIR")]
    pub local_dir: Option<PathBuf>,

    /// Never touch the network
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Size weights quantized at an explicit bits-per-weight (EXL2 and friends)
    Exl2(commands::Exl2Command),

    /// Size GGUF weights quantized with a named scheme
    Gguf(commands::GgufCommand),

    /// List known GGUF quantization schemes
    #[command(alias = "schemes")]
    Quants,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the built-in defaults as TOML
    Defaults,
}

/// The full command definition.
pub fn build_cli() -> clap::Command {
    Cli::command()
}
