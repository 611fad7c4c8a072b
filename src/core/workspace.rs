//! Workspace (cdtdevel.toml) parsing and language discovery
//!
//! The manifest is the main configuration file of a project. Languages are
//! listed explicitly under `[languages.<id>]` or discovered as the
//! subdirectories of `project.languages_dir` that contain a `language.toml`.
//!
//! ```toml
//! [project]
//! name = "cryptdatum"
//! languages_dir = "implementations"
//!
//! [build]
//! out_dir = "build"
//! jobs = 4
//!
//! [env]
//! CDT_SPEC_VERSION = "1"
//!
//! [languages.c]
//! path = "native/c"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::language::{Language, LanguageConfig, TaskRunner};
use super::registry::LanguageRegistry;
use crate::config::defaults::{ALL_TARGET, DEFAULT_OUT_DIR, LANGUAGE_FILE, LOGS_DIR, MANIFEST_FILE};
use crate::error::WorkspaceError;
use crate::infra::filesystem;

/// The project manifest (cdtdevel.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Project configuration
    #[serde(default)]
    pub project: ProjectConfig,

    /// Build configuration
    #[serde(default)]
    pub build: BuildSettings,

    /// Environment variables shared by all languages
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Explicitly listed languages
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageRef>,
}

impl Manifest {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Project description
    #[serde(default)]
    pub description: Option<String>,

    /// Directory whose subdirectories are language implementations
    #[serde(default)]
    pub languages_dir: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            version: default_version(),
            description: None,
            languages_dir: None,
        }
    }
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildSettings {
    /// Output directory, relative to the project root
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Number of parallel jobs handed to tasks
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Keep per-language task logs under `<out_dir>/logs`
    #[serde(default = "default_logs")]
    pub logs: bool,
}

fn default_out_dir() -> String {
    DEFAULT_OUT_DIR.to_string()
}

fn default_logs() -> bool {
    true
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            jobs: None,
            logs: default_logs(),
        }
    }
}

/// Reference to a language directory in the manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguageRef {
    /// Directory relative to the project root
    pub path: String,
}

/// A language found in the workspace
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageSpec {
    /// Language identifier
    pub id: String,
    /// Language directory
    pub root: PathBuf,
    /// Parsed `language.toml` (default when the file is absent)
    pub config: LanguageConfig,
}

/// A loaded project
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    manifest: Manifest,
    languages: Vec<LanguageSpec>,
}

impl Workspace {
    /// Load the manifest in `root` and every language it names
    pub fn load(root: &Path) -> Result<Self, WorkspaceError> {
        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(WorkspaceError::ManifestNotFound {
                path: root.to_path_buf(),
            });
        }

        let content = filesystem::read_file(&manifest_path)?;
        let manifest = Manifest::from_toml(&content).map_err(|e| WorkspaceError::Parse {
            path: manifest_path.clone(),
            error: e.to_string(),
        })?;

        Self::from_manifest(root, manifest)
    }

    /// Resolve the languages of an already parsed manifest
    pub fn from_manifest(root: &Path, manifest: Manifest) -> Result<Self, WorkspaceError> {
        let mut dirs: BTreeMap<String, PathBuf> = BTreeMap::new();

        let scan_dir = manifest
            .project
            .languages_dir
            .as_ref()
            .map(|dir| root.join(dir))
            .filter(|dir| dir.is_dir());
        if let Some(scan_dir) = scan_dir {
            for dir in filesystem::list_dirs(&scan_dir)? {
                if !dir.join(LANGUAGE_FILE).is_file() {
                    continue;
                }
                let Some(id) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                    continue;
                };
                if let Err(e) = validate_identifier(&id) {
                    tracing::warn!(path = %dir.display(), "skipping language directory: {e}");
                    continue;
                }
                dirs.insert(id, dir.clone());
            }
        }

        // Explicit entries override discovered ones
        for (id, language_ref) in &manifest.languages {
            validate_identifier(id)?;
            dirs.insert(id.clone(), root.join(&language_ref.path));
        }

        let mut languages = Vec::with_capacity(dirs.len());
        for (id, dir) in dirs {
            languages.push(load_language(&id, dir)?);
        }

        tracing::debug!(
            project = %manifest.project.name,
            languages = languages.len(),
            "loaded workspace"
        );

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
            languages,
        })
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parsed manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Languages sorted by identifier
    pub fn languages(&self) -> &[LanguageSpec] {
        &self.languages
    }

    /// Find a language by identifier
    pub fn language(&self, id: &str) -> Option<&LanguageSpec> {
        self.languages.iter().find(|l| l.id == id)
    }

    /// Output directory
    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.build.out_dir)
    }

    /// Task log directory, when logging is enabled
    pub fn logs_dir(&self) -> Option<PathBuf> {
        self.manifest
            .build
            .logs
            .then(|| self.out_dir().join(LOGS_DIR))
    }

    /// Parallel jobs handed to tasks
    pub fn jobs(&self) -> usize {
        self.manifest.build.jobs.unwrap_or_else(num_cpus::get)
    }

    /// Register every language with the given runner
    pub fn register_languages(
        &self,
        registry: &LanguageRegistry,
        runner: &Arc<dyn TaskRunner>,
    ) -> Result<(), WorkspaceError> {
        for spec in &self.languages {
            registry.register(Language::new(
                spec.id.clone(),
                spec.root.clone(),
                spec.config.clone(),
                Arc::clone(runner),
            ))?;
        }
        Ok(())
    }
}

fn load_language(id: &str, root: PathBuf) -> Result<LanguageSpec, WorkspaceError> {
    if !root.is_dir() {
        return Err(WorkspaceError::LanguageDirNotFound {
            language: id.to_string(),
            path: root,
        });
    }

    let config_path = root.join(LANGUAGE_FILE);
    let config = if config_path.is_file() {
        let content = filesystem::read_file(&config_path)?;
        LanguageConfig::from_toml(&content).map_err(|e| WorkspaceError::Parse {
            path: config_path.clone(),
            error: e.to_string(),
        })?
    } else {
        tracing::debug!(language = %id, "no {LANGUAGE_FILE}, using empty configuration");
        LanguageConfig::default()
    };

    Ok(LanguageSpec {
        id: id.to_string(),
        root,
        config,
    })
}

/// Check that an identifier can be used as a build target
pub fn validate_identifier(id: &str) -> Result<(), WorkspaceError> {
    let invalid = |reason: &str| WorkspaceError::InvalidIdentifier {
        language: id.to_string(),
        reason: reason.to_string(),
    };

    if id.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if id == ALL_TARGET {
        return Err(invalid("'all' is reserved for building every language"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
    {
        return Err(invalid(
            "only ASCII letters, digits, '-', '_', '+' and '.' are allowed",
        ));
    }
    Ok(())
}
