//! Argument parsing through clap's test utilities (no process spawning).

use clap::Parser;
use llm_vram_cli::{Cli, Commands, ConfigAction, LogFormat, OutputFormat};

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("llm-vram").chain(args.iter().copied()))
}

#[test]
fn build_cli_command_name() {
    assert_eq!(llm_vram_cli::build_cli().get_name(), "llm-vram");
}

#[test]
fn command_definition_is_consistent() {
    llm_vram_cli::build_cli().debug_assert();
}

#[test]
fn exl2_with_all_options() {
    let cli = parse(&["exl2", "--model", "a/b", "--context", "8192", "--cache-bits", "8", "--bpw", "5.0"])
        .unwrap();
    let Commands::Exl2(cmd) = cli.command else { panic!("expected exl2") };
    assert_eq!(cmd.model, "a/b");
    assert_eq!(cmd.context, 8192);
    assert_eq!(cmd.cache_bits, Some(8));
    assert_eq!(cmd.bpw, Some(5.0));
}

#[test]
fn exl2_optional_values_default_to_none() {
    let cli = parse(&["exl2", "-m", "a/b", "-n", "2048"]).unwrap();
    let Commands::Exl2(cmd) = cli.command else { panic!("expected exl2") };
    assert_eq!(cmd.cache_bits, None);
    assert_eq!(cmd.bpw, None);
}

#[test]
fn gguf_quant_defaults_to_empty() {
    let cli = parse(&["gguf", "--model", "a/b", "--ctx", "4096"]).unwrap();
    let Commands::Gguf(cmd) = cli.command else { panic!("expected gguf") };
    assert_eq!(cmd.context, 4096);
    assert_eq!(cmd.quant, "");
}

#[test]
fn context_is_required() {
    let err = parse(&["gguf", "--model", "a/b"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn negative_context_is_rejected() {
    assert!(parse(&["gguf", "-m", "a/b", "-n", "-1"]).is_err());
}

#[test]
fn global_flags_after_subcommand() {
    let cli = parse(&["quants", "--format", "json", "--offline", "--log-format", "json"]).unwrap();
    assert!(matches!(cli.command, Commands::Quants));
    assert_eq!(cli.format, OutputFormat::Json);
    assert_eq!(cli.log_format, LogFormat::Json);
    assert!(cli.offline);
}

#[test]
fn defaults() {
    let cli = parse(&["quants"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Text);
    assert_eq!(cli.log_format, LogFormat::Compact);
    assert_eq!(cli.log_level, "warn");
    assert!(cli.config.is_none());
}

#[test]
fn unknown_output_format() {
    let err = parse(&["--format", "yaml", "quants"]).unwrap_err();
    assert!(err.to_string().contains("expected one of: text, json") || err.to_string().contains("text, json"));
}

#[test]
fn config_show() {
    let cli = parse(&["config", "show"]).unwrap();
    assert!(matches!(cli.command, Commands::Config { action: ConfigAction::Show }));
}
