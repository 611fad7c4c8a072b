//! Error types for cdtdevel
//!
//! Domain-specific error types using thiserror.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Environment resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// No environment is known for the language
    #[error("No build environment known for language '{language}'")]
    UnknownLanguage { language: String },

    /// Required variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVariable(String),

    /// Variable has invalid value
    #[error("Invalid value for {variable}: {reason}")]
    InvalidValue { variable: String, reason: String },
}

/// Task execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Session was cancelled before or while the task ran
    #[error("Task '{task}' cancelled")]
    Cancelled { task: String },

    /// Task descriptor has a shape the runner does not understand
    #[error("Invalid task descriptor: {reason}")]
    InvalidDescriptor { reason: String },

    /// Program could not be resolved on PATH
    #[error("Program '{program}' not found in PATH")]
    ProgramNotFound { program: String },

    /// Process could not be spawned
    #[error("Failed to start task '{task}': {error}")]
    Spawn { task: String, error: String },

    /// Process exited unsuccessfully
    #[error("Task '{task}' failed with {}", describe_exit(*code, stderr))]
    Failed {
        task: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Task output could not be written to the build log
    #[error("Failed to write build log '{path}': {error}")]
    Log { path: PathBuf, error: String },
}

fn describe_exit(code: Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{status}: {stderr}")
    }
}

/// Language registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A language with the same identifier is already registered
    #[error("Language '{language}' is already registered")]
    AlreadyRegistered { language: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to read directory
    #[error("Failed to read directory '{path}': {error}")]
    ReadDir { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to append to file
    #[error("Failed to append to file '{path}': {error}")]
    AppendFile { path: PathBuf, error: String },
}

/// Workspace loading errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Manifest not found
    #[error("No cdtdevel.toml found at '{path}'")]
    ManifestNotFound { path: PathBuf },

    /// Manifest or language config could not be parsed
    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Language directory does not exist
    #[error("Directory for language '{language}' not found: {path}")]
    LanguageDirNotFound { language: String, path: PathBuf },

    /// Language identifier cannot be used as a build target
    #[error("Invalid language identifier '{language}': {reason}")]
    InvalidIdentifier { language: String, reason: String },

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Registry error
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors from building a single language
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Language is not in the registry
    #[error("no libraries loaded for language {language}")]
    NotRegistered { language: String },

    /// Environment mapper failed; passed through unchanged
    #[error(transparent)]
    Environment(#[from] EnvError),

    /// First failing task; passed through unchanged
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// One failed language in a multi-language build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFailure {
    /// Language identifier
    pub language: String,
    /// Error returned by the language build
    pub error: BuildError,
}

impl fmt::Display for LanguageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.language, self.error)
    }
}

/// Aggregated errors from building several languages.
///
/// Failures accumulate in the order languages were attempted. An empty
/// aggregate means every attempted language built successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildErrors {
    failures: Vec<LanguageFailure>,
}

impl BuildErrors {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a language
    pub fn push(&mut self, language: impl Into<String>, error: BuildError) {
        self.failures.push(LanguageFailure {
            language: language.into(),
            error,
        });
    }

    /// True when no language failed
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failed languages
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Iterate over the recorded failures
    pub fn iter(&self) -> std::slice::Iter<'_, LanguageFailure> {
        self.failures.iter()
    }

    /// Identifiers of the failed languages
    pub fn languages(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.language.as_str()).collect()
    }

    /// Error recorded for a language, if it failed
    pub fn get(&self, language: &str) -> Option<&BuildError> {
        self.failures
            .iter()
            .find(|f| f.language == language)
            .map(|f| &f.error)
    }

    /// `Ok(())` when empty, otherwise the aggregate itself
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.failures.len() == 1 {
            "language"
        } else {
            "languages"
        };
        write!(f, "{} {noun} failed to build", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildErrors {}

impl<'a> IntoIterator for &'a BuildErrors {
    type Item = &'a LanguageFailure;
    type IntoIter = std::slice::Iter<'a, LanguageFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

impl IntoIterator for BuildErrors {
    type Item = LanguageFailure;
    type IntoIter = std::vec::IntoIter<LanguageFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}
