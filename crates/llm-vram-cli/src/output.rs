//! Report rendering.

use anyhow::{Context, Result};
use console::style;
use llm_vram::{Diagnostic, SizingParams, SizingReport};
use serde::Serialize;
use std::io::Write;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'. Expected one of: text, json")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Write `report` to `out` in `format`.
pub fn write_report(out: &mut impl Write, report: &SizingReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Text => write_report_text(out, report),
    }
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize output")?;
    writeln!(out)?;
    Ok(())
}

fn write_report_text(out: &mut impl Write, report: &SizingReport) -> Result<()> {
    let detail = match &report.params {
        SizingParams::ExplicitBpw { context, cache_bit, bpw, .. } => {
            format!("context {context}, {bpw} bpw, {cache_bit}-bit cache")
        }
        SizingParams::NamedQuantization { context, quant_size, .. } => {
            format!("context {context}, {quant_size}")
        }
    };
    writeln!(out, "{} ({detail})", style(report.params.model_id()).bold())?;
    writeln!(out, "  model    {:>8.2} GiB", report.model_size())?;
    writeln!(out, "  context  {:>8.2} GiB", report.context_size())?;
    writeln!(out, "  {}    {:>8.2} GiB", style("total").bold(), report.total_size())?;
    for diagnostic in &report.diagnostics {
        writeln!(out, "  {} {}", style("warning:").yellow(), describe(diagnostic))?;
    }
    Ok(())
}

fn describe(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::UnknownQuantScheme { .. } => {
            format!("{diagnostic} (known schemes: {})", llm_vram::list_quantization_schemes().join(", "))
        }
        other => other.to_string(),
    }
}

/// Quantization table, one scheme per line with its bits per weight.
pub fn write_schemes(out: &mut impl Write, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &llm_vram::list_quantization_schemes()),
        OutputFormat::Text => {
            for scheme in llm_vram::QuantScheme::ALL {
                writeln!(out, "{:<8} {:>5.2} bpw", scheme.name(), scheme.bits_per_weight())?;
            }
            Ok(())
        }
    }
}
