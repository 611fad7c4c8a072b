//! Build orchestration logic
//!
//! Coordinates building one language or every registered language.
//!
//! A single language build is fail-fast: tasks run in declaration order and
//! the first failing task ends the build. Building all languages is not: every
//! language in the registry snapshot is attempted and the failures are
//! collected into one [`BuildErrors`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::build_env::{EnvMapper, WorkspaceEnvMapper};
use super::language::TaskRunner;
use super::registry::LanguageRegistry;
use super::session::Session;
use super::workspace::Workspace;
use crate::error::{BuildError, BuildErrors, WorkspaceError};

/// Outcome of building every registered language
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Languages that built successfully, in build order
    pub built: Vec<String>,
    /// Languages that failed
    pub failures: BuildErrors,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl BuildReport {
    /// Number of languages attempted
    pub fn attempted(&self) -> usize {
        self.built.len() + self.failures.len()
    }

    /// True when no language failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Ok(())` when every language built, otherwise the collected failures
    pub fn into_result(self) -> Result<(), BuildErrors> {
        self.failures.into_result()
    }
}

/// Build orchestrator state
pub struct BuildOrchestrator {
    registry: LanguageRegistry,
    env_mapper: Arc<dyn EnvMapper>,
}

impl BuildOrchestrator {
    /// Create an orchestrator with an empty registry
    pub fn new(env_mapper: Arc<dyn EnvMapper>) -> Self {
        Self::with_registry(LanguageRegistry::new(), env_mapper)
    }

    /// Create an orchestrator owning an existing registry
    pub fn with_registry(registry: LanguageRegistry, env_mapper: Arc<dyn EnvMapper>) -> Self {
        Self {
            registry,
            env_mapper,
        }
    }

    /// Create an orchestrator for a loaded workspace.
    ///
    /// Every workspace language is registered with `runner` and the
    /// environment comes from a [`WorkspaceEnvMapper`].
    pub fn from_workspace(
        workspace: &Workspace,
        runner: Arc<dyn TaskRunner>,
    ) -> Result<Self, WorkspaceError> {
        let orchestrator = Self::new(Arc::new(WorkspaceEnvMapper::from_workspace(workspace)));
        workspace.register_languages(&orchestrator.registry, &runner)?;
        Ok(orchestrator)
    }

    /// The language registry
    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Build one language.
    ///
    /// The registry lock is only held for the lookup; the environment
    /// mapper and the tasks run without it.
    pub fn build_language(&self, session: &Session, language: &str) -> Result<(), BuildError> {
        let started = Instant::now();
        tracing::info!(language = %language, session = %session.id(), "build language packages...");

        let entry = self
            .registry
            .lookup(language)
            .ok_or_else(|| BuildError::NotRegistered {
                language: language.to_string(),
            })?;

        tracing::debug!(language = %language, name = %entry.display_name(), "found language");
        let env = self.env_mapper.resolve(session, language)?;

        let tasks = entry.tasks();
        if tasks.is_empty() {
            tracing::warn!(language = %language, "nothing to build");
            return Ok(());
        }

        for (index, task) in tasks.iter().enumerate() {
            tracing::debug!(
                language = %language,
                task = index + 1,
                total = tasks.len(),
                "running task"
            );
            if let Err(e) = entry.do_task(session, task, &env) {
                tracing::debug!(language = %language, task = index + 1, error = %e, "task failed");
                return Err(e.into());
            }
        }

        tracing::info!(
            language = %language,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "done"
        );
        Ok(())
    }

    /// Build every registered language, collecting all failures
    pub fn build_all(&self, session: &Session) -> Result<(), BuildErrors> {
        self.build_all_report(session).into_result()
    }

    /// Build every registered language and report per-language outcomes.
    ///
    /// Languages registered after the snapshot is taken are not part of
    /// this run.
    pub fn build_all_report(&self, session: &Session) -> BuildReport {
        let started = Instant::now();
        let languages = self.registry.snapshot();
        tracing::info!(languages = languages.len(), session = %session.id(), "build all packages...");

        let mut report = BuildReport::default();
        for language in languages {
            match self.build_language(session, &language) {
                Ok(()) => report.built.push(language),
                Err(e) => {
                    tracing::error!(language = %language, error = %e, "language build failed");
                    report.failures.push(language, e);
                }
            }
        }

        report.elapsed = started.elapsed();
        tracing::info!(
            built = report.built.len(),
            failed = report.failures.len(),
            "done"
        );
        report
    }
}
