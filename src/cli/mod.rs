//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use commands::Commands;
use output::OutputConfig;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", ",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    ")"
);

/// cdtdevel - Multi-language build orchestrator
///
/// Build the Cryptdatum implementations of every registered language.
#[derive(Parser, Debug)]
#[command(name = "cdtdevel")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long = "project", value_name = "DIR", global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output settings derived from the global flags
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.json, self.verbose)
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let output = self.output_config();
        if let Some(cmd) = self.command {
            let project_dir = match self.project {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            cmd.run(&project_dir, output).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
