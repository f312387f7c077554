use anyhow::Result;
use clap::Parser;
use llm_vram_cli::{Cli, commands, logging};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(&cli.log_level, cli.log_format)?;

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = commands::run(&cli, &mut stdout).await {
        error!("Command failed: {}", e);

        let mut source = e.source();
        while let Some(err) = source {
            error!("  Caused by: {}", err);
            source = err.source();
        }

        std::process::exit(1);
    }

    Ok(())
}
