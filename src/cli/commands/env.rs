//! Env command implementation
//!
//! Implements `cdtdevel env <LANGUAGE>` to print the environment a
//! language's tasks would receive.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::output::OutputConfig;
use crate::core::build_env::{EnvMapper, WorkspaceEnvMapper};
use crate::core::session::Session;
use crate::core::workspace::Workspace;

/// Execute the env command
pub async fn execute(project_dir: &Path, language: &str, output: OutputConfig) -> Result<()> {
    let workspace = Workspace::load(project_dir)
        .with_context(|| format!("Failed to load workspace at {}", project_dir.display()))?;

    let mapper = WorkspaceEnvMapper::from_workspace(&workspace);
    let env: BTreeMap<String, String> = mapper
        .resolve(&Session::new(), language)?
        .into_iter()
        .collect();

    if output.json {
        println!("{}", serde_json::to_string_pretty(&env)?);
    } else if !output.quiet {
        for (key, value) in &env {
            println!("{key}={value}");
        }
    }
    Ok(())
}
