//! Language build targets
//!
//! A language entry pairs the parsed `language.toml` of one implementation
//! directory with the task runner that knows how to execute its tasks.
//!
//! ```toml
//! [language]
//! name = "Go"
//!
//! [build]
//! tasks = [
//!     "go vet ./...",
//!     { name = "library", run = "go", args = ["build", "./..."] },
//! ]
//!
//! [env]
//! CGO_ENABLED = "0"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::session::Session;
use crate::error::TaskError;

/// Environment variables injected into one language's task executions
pub type EnvMap = HashMap<String, String>;

/// One build step, exactly as written in configuration.
///
/// The orchestrator never looks inside a descriptor; only the task runner
/// gives it meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescriptor(toml::Value);

impl TaskDescriptor {
    /// Wrap a configuration value
    pub fn new(value: toml::Value) -> Self {
        Self(value)
    }

    /// The raw configuration value
    pub fn value(&self) -> &toml::Value {
        &self.0
    }
}

impl From<&str> for TaskDescriptor {
    fn from(command: &str) -> Self {
        Self(toml::Value::String(command.to_string()))
    }
}

/// Parsed `language.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Descriptive metadata
    #[serde(default)]
    pub language: LanguageMeta,

    /// Build configuration
    #[serde(default)]
    pub build: BuildConfig,

    /// Extra environment variables for this language's tasks
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl LanguageConfig {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Descriptive language metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageMeta {
    /// Display name (e.g. "Go")
    #[serde(default)]
    pub name: Option<String>,

    /// Implementation version
    #[serde(default)]
    pub version: Option<String>,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,
}

/// Build section of `language.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Tasks in execution order; empty means nothing to build
    #[serde(default)]
    pub tasks: Vec<TaskDescriptor>,
}

/// Executes a single task descriptor for a language
pub trait TaskRunner: Send + Sync {
    /// Run one task with the given environment mapping
    fn run_task(
        &self,
        session: &Session,
        language: &Language,
        task: &TaskDescriptor,
        env: &EnvMap,
    ) -> Result<(), TaskError>;
}

/// A registered language build target
pub struct Language {
    id: String,
    root: PathBuf,
    config: LanguageConfig,
    runner: Arc<dyn TaskRunner>,
}

impl Language {
    /// Create a language entry
    pub fn new(
        id: impl Into<String>,
        root: impl Into<PathBuf>,
        config: LanguageConfig,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
            config,
            runner,
        }
    }

    /// Language identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Language directory; tasks run here
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Display name, falling back to the identifier
    pub fn display_name(&self) -> &str {
        self.config.language.name.as_deref().unwrap_or(&self.id)
    }

    /// Build tasks in declaration order
    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.config.build.tasks
    }

    /// Execute one task of this language
    pub fn do_task(
        &self,
        session: &Session,
        task: &TaskDescriptor,
        env: &EnvMap,
    ) -> Result<(), TaskError> {
        self.runner.run_task(session, self, task, env)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
