//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project with the sample manifest
    #[allow(dead_code)]
    pub fn with_manifest() -> Self {
        let project = Self::new();
        project.create_file("cdtdevel.toml", SAMPLE_MANIFEST);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a language directory with the given language.toml
    #[allow(dead_code)]
    pub fn create_language(&self, id: &str, language_toml: &str) {
        self.create_file(&format!("implementations/{id}/language.toml"), language_toml);
    }

    /// Check if a file exists in the test project
    #[allow(dead_code)]
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run cdtdevel in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_cdtdevel"))
            .current_dir(self.path())
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute cdtdevel")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Stdout of a finished command
#[allow(dead_code)]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Stderr of a finished command
#[allow(dead_code)]
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Sample manifest TOML for testing
#[allow(dead_code)]
pub const SAMPLE_MANIFEST: &str = r#"
[project]
name = "test-project"
languages_dir = "implementations"

[build]
jobs = 2

[env]
CDT_TEST_SHARED = "shared"
"#;

/// Language whose single task writes its environment to a file
#[allow(dead_code)]
pub const WRITING_LANGUAGE: &str = r#"
[language]
name = "Writer"

[build]
tasks = [
    { name = "write", run = "sh", args = ["-c", "printf '%s %s' \"$CDT_LANGUAGE\" \"$CDT_TEST_SHARED\" > built.txt"] },
]
"#;

/// Language whose second task fails
#[allow(dead_code)]
pub const FAILING_LANGUAGE: &str = r#"
[build]
tasks = [
    "touch first.txt",
    { name = "explode", run = "sh", args = ["-c", "echo exploded >&2; exit 7"] },
    "touch third.txt",
]
"#;

/// Language without tasks
#[allow(dead_code)]
pub const EMPTY_LANGUAGE: &str = r#"
[language]
name = "Empty"
"#;
