//! Build command implementation
//!
//! Implements `cdtdevel build <all|LANGUAGE>`.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::output::{create_spinner, status, OutputConfig};
use crate::config::defaults::ALL_TARGET;
use crate::core::builder::{BuildOrchestrator, BuildReport};
use crate::core::session::Session;
use crate::core::workspace::Workspace;
use crate::infra::shell::ShellTaskRunner;

/// Execute the build command
pub async fn execute(project_dir: &Path, target: Option<String>, output: OutputConfig) -> Result<()> {
    let Some(target) = target else {
        bail!("missing argument 'all' or language to build");
    };

    let workspace = Workspace::load(project_dir)
        .with_context(|| format!("Failed to load workspace at {}", project_dir.display()))?;
    tracing::info!("Building project: {}", workspace.manifest().project.name);

    let runner = match workspace.logs_dir() {
        Some(dir) => ShellTaskRunner::new().with_logs_dir(dir),
        None => ShellTaskRunner::new(),
    };
    let orchestrator = BuildOrchestrator::from_workspace(&workspace, Arc::new(runner))
        .context("Failed to register languages")?;

    let session = Session::new();
    let canceller = session.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling build");
            canceller.cancel();
        }
    });

    let spinner = create_spinner(&format!("Building {target}..."), output);
    let result = if target == ALL_TARGET {
        let report =
            tokio::task::spawn_blocking(move || orchestrator.build_all_report(&session))
                .await
                .context("Build thread panicked")?;
        spinner.finish_and_clear();
        print_report(&report, output)?;
        report.into_result().map_err(anyhow::Error::from)
    } else {
        let language = target.clone();
        let build_session = session.clone();
        let result = tokio::task::spawn_blocking(move || {
            orchestrator.build_language(&build_session, &language)
        })
        .await
        .context("Build thread panicked")?;
        spinner.finish_and_clear();
        print_language_result(&target, session.elapsed(), result.as_ref().err(), output)?;
        result.map_err(anyhow::Error::from)
    };

    interrupt.abort();
    result
}

fn print_report(report: &BuildReport, output: OutputConfig) -> Result<()> {
    if output.json {
        let failed: Vec<_> = report
            .failures
            .iter()
            .map(|f| serde_json::json!({ "language": f.language, "error": f.error.to_string() }))
            .collect();
        let value = serde_json::json!({
            "target": ALL_TARGET,
            "success": report.is_success(),
            "built": report.built,
            "failed": failed,
            "elapsed_ms": millis(report.elapsed),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    if output.quiet {
        return Ok(());
    }

    for language in &report.built {
        println!("{} {language}", status::SUCCESS);
    }
    for failure in &report.failures {
        println!("{} {}", status::ERROR, failure.language);
    }
    println!(
        "\nBuild finished: {} built, {} failed ({:.1}s)",
        report.built.len(),
        report.failures.len(),
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

fn print_language_result(
    language: &str,
    elapsed: Duration,
    error: Option<&crate::error::BuildError>,
    output: OutputConfig,
) -> Result<()> {
    if output.json {
        let value = serde_json::json!({
            "target": language,
            "success": error.is_none(),
            "error": error.map(ToString::to_string),
            "elapsed_ms": millis(elapsed),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if !output.quiet && error.is_none() {
        println!(
            "{} Built {language} ({:.1}s)",
            status::SUCCESS,
            elapsed.as_secs_f64()
        );
    }
    Ok(())
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
