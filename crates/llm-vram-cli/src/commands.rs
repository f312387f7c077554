//! Command handlers.

use crate::output::{self, OutputFormat};
use crate::{Cli, Commands, ConfigAction};
use anyhow::{Context, Result};
use clap::Args;
use llm_vram::{EstimatorConfig, HubConfig, ResolverChain, VramCalculator};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

/// Arguments of `llm-vram exl2`.
#[derive(Debug, Clone, Args)]
pub struct Exl2Command {
    /// Model id, e.g. Nexusflow/Starling-LM-7B-beta
    #[arg(short, long, value_name = "ID")]
    pub model: String,

    /// Context length in tokens
    #[arg(short = 'n', long, value_name = "TOKENS", alias = "ctx")]
    pub context: u64,

    /// KV cache precision in bits [default: from config, 16]
    #[arg(long, value_name = "BITS")]
    pub cache_bits: Option<u32>,

    /// Weight bits per parameter [default: from config, 4.5]
    #[arg(long, value_name = "BPW")]
    pub bpw: Option<f64>,
}

/// Arguments of `llm-vram gguf`.
#[derive(Debug, Clone, Args)]
pub struct GgufCommand {
    /// Model id, e.g. Nexusflow/Starling-LM-7B-beta
    #[arg(short, long, value_name = "ID")]
    pub model: String,

    /// Context length in tokens
    #[arg(short = 'n', long, value_name = "TOKENS", alias = "ctx")]
    pub context: u64,

    /// GGUF quantization scheme (see `llm-vram quants`)
    #[arg(short, long, value_name = "NAME", default_value = "")]
    pub quant: String,
}

/// Configuration as the commands see it, after file, environment and flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub estimator: EstimatorConfig,
    pub hub: HubConfig,
}

impl EffectiveConfig {
    /// Resolve configuration for `cli`.
    ///
    /// Order: defaults, then the `--config` file, then `LLM_VRAM_*` environment
    /// overrides, then `--offline`.
    pub fn load(cli: &Cli) -> Result<Self> {
        // Both loaders apply the LLM_VRAM_* overrides and validate.
        let estimator = match &cli.config {
            Some(path) => EstimatorConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => EstimatorConfig::from_env().context("invalid estimator configuration")?,
        };

        let mut hub = HubConfig::from_env().context("invalid hub configuration")?;
        if cli.offline {
            hub.offline = true;
        }
        debug!(?estimator, ?hub, "effective configuration");
        Ok(Self { estimator, hub })
    }

    pub fn calculator(&self, cli: &Cli) -> Result<VramCalculator<ResolverChain>> {
        let mut builder = VramCalculator::builder()
            .config(self.estimator.clone())
            .hub(self.hub.clone());
        if let Some(dir) = &cli.local_dir {
            builder = builder.local_dir(dir);
        }
        builder.build().context("failed to set up model metadata resolvers")
    }
}

/// Run the parsed command line, writing results to `out`.
pub async fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Commands::Exl2(cmd) => cmd.execute(cli, out).await,
        Commands::Gguf(cmd) => cmd.execute(cli, out).await,
        Commands::Quants => output::write_schemes(out, cli.format),
        Commands::Config { action } => handle_config_command(*action, cli, out),
    }
}

impl Exl2Command {
    pub async fn execute(&self, cli: &Cli, out: &mut impl Write) -> Result<()> {
        let calc = EffectiveConfig::load(cli)?.calculator(cli)?;
        info!(model = %self.model, context = self.context, "sizing EXL2 weights");
        let report = calc
            .size_with_explicit_bpw(&self.model, self.context, self.cache_bits, self.bpw)
            .await
            .with_context(|| format!("failed to size {}", self.model))?;
        output::write_report(out, &report, cli.format)
    }
}

impl GgufCommand {
    pub async fn execute(&self, cli: &Cli, out: &mut impl Write) -> Result<()> {
        let calc = EffectiveConfig::load(cli)?.calculator(cli)?;
        info!(model = %self.model, context = self.context, quant = %self.quant, "sizing GGUF weights");
        let report = calc
            .size_with_named_quantization(&self.model, self.context, &self.quant)
            .await
            .with_context(|| format!("failed to size {}", self.model))?;
        output::write_report(out, &report, cli.format)
    }
}

fn handle_config_command(action: ConfigAction, cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = match action {
        ConfigAction::Show => EffectiveConfig::load(cli)?,
        ConfigAction::Defaults => {
            EffectiveConfig { estimator: EstimatorConfig::default(), hub: HubConfig::default() }
        }
    };
    match cli.format {
        OutputFormat::Json => output::write_json(out, &config),
        OutputFormat::Text => {
            let text = toml::to_string_pretty(&config).context("failed to serialize configuration")?;
            write!(out, "{text}")?;
            Ok(())
        }
    }
}
