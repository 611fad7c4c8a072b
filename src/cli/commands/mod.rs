//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod env;
pub mod list;

use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use super::output::OutputConfig;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build Cryptdatum libraries and binaries
    #[command(
        long_about = "Build Cryptdatum libraries and binaries.\n\nMost of these build binaries are example implementations used for testing and benchmarking."
    )]
    Build {
        /// 'all' or the language to build
        target: Option<String>,
    },

    /// List registered languages
    List,

    /// Show the build environment of a language
    Env {
        /// Language identifier
        language: String,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, project_dir: &Path, output: OutputConfig) -> Result<()> {
        match self {
            Self::Build { target } => build::execute(project_dir, target, output).await,
            Self::List => list::execute(project_dir, output).await,
            Self::Env { language } => env::execute(project_dir, &language, output).await,
        }
    }
}
