//! cdtdevel CLI - Multi-language build orchestrator
//!
//! Entry point for the cdtdevel command-line application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cdtdevel::cli::output::display_error;
use cdtdevel::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output_config = cli.output_config();

    // RUST_LOG overrides the level chosen by -v/-q
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(output_config.log_directive())),
        )
        .with_writer(std::io::stderr)
        .init();

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
