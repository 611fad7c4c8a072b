//! List command implementation
//!
//! Implements `cdtdevel list` to show the languages of the workspace.

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::output::{status, OutputConfig};
use crate::core::workspace::Workspace;

/// Execute the list command
pub async fn execute(project_dir: &Path, output: OutputConfig) -> Result<()> {
    let workspace = Workspace::load(project_dir)
        .with_context(|| format!("Failed to load workspace at {}", project_dir.display()))?;

    if output.json {
        let languages: Vec<_> = workspace
            .languages()
            .iter()
            .map(|spec| {
                serde_json::json!({
                    "id": spec.id,
                    "name": spec.config.language.name,
                    "version": spec.config.language.version,
                    "description": spec.config.language.description,
                    "path": spec.root.display().to_string(),
                    "tasks": spec.config.build.tasks.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&languages)?);
        return Ok(());
    }
    if output.quiet {
        return Ok(());
    }

    if workspace.languages().is_empty() {
        println!("No languages registered in {}", workspace.manifest().project.name);
        return Ok(());
    }

    let project = &workspace.manifest().project;
    println!("Languages in {} {}:", project.name, project.version);
    if let Some(ref description) = project.description {
        println!("{description}");
    }
    println!();

    for spec in workspace.languages() {
        let relative = spec
            .root
            .strip_prefix(workspace.root())
            .unwrap_or(&spec.root);
        let tasks = spec.config.build.tasks.len();
        if tasks == 0 {
            println!(
                "  {} {:<12} {} (nothing to build)",
                status::WARNING,
                spec.id,
                relative.display()
            );
        } else {
            println!(
                "  • {:<12} {} ({tasks} task{})",
                spec.id,
                relative.display(),
                if tasks == 1 { "" } else { "s" }
            );
        }

        let meta = &spec.config.language;
        let version = meta.version.as_deref().map(|v| format!(" {v}")).unwrap_or_default();
        match (meta.name.as_deref(), meta.description.as_deref()) {
            (Some(name), Some(description)) => println!("      {name}{version}: {description}"),
            (Some(name), None) => println!("      {name}{version}"),
            (None, Some(description)) => println!("      {description}"),
            (None, None) => {}
        }
    }
    Ok(())
}
