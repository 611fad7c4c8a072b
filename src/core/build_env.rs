//! Build environment setup
//!
//! Provides the environment mapping injected into every task of a language
//! build. Sets up `CDT_LANGUAGE`, `CDT_ROOT`, `CDT_SRCDIR`, `CDT_OUTDIR`,
//! `CDT_JOBS` and `CDT_SESSION`, followed by the workspace and language
//! `[env]` tables.

use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use super::language::EnvMap;
use super::session::Session;
use super::workspace::Workspace;
use crate::config::defaults::{
    ENV_JOBS, ENV_LANGUAGE, ENV_OUTDIR, ENV_ROOT, ENV_SESSION, ENV_SRCDIR,
};
use crate::error::EnvError;

/// Produces the environment mapping for a language build
pub trait EnvMapper: Send + Sync {
    /// Resolve the environment for one language
    fn resolve(&self, session: &Session, language: &str) -> Result<EnvMap, EnvError>;
}

/// Build environment for a language.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEnvironment {
    /// Language identifier
    pub language: String,
    /// Project root (directory holding cdtdevel.toml)
    pub project_root: PathBuf,
    /// Language source directory
    pub srcdir: PathBuf,
    /// Output directory for this language's artifacts
    pub outdir: PathBuf,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Additional environment variables
    pub extra_env: BTreeMap<String, String>,
}

impl BuildEnvironment {
    /// Create environment for a language with the host's CPU count as jobs
    pub fn for_language(
        language: &str,
        project_root: PathBuf,
        srcdir: PathBuf,
        outdir: PathBuf,
    ) -> Self {
        Self {
            language: language.to_string(),
            project_root,
            srcdir,
            outdir,
            jobs: num_cpus::get(),
            extra_env: BTreeMap::new(),
        }
    }

    /// Set the number of parallel jobs
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Add an extra environment variable
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.extra_env.insert(key.to_string(), value.to_string());
        self
    }

    /// Add several extra variables; later values replace earlier ones
    #[must_use]
    pub fn with_envs<'a>(mut self, vars: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (key, value) in vars {
            self.extra_env.insert(key.clone(), value.clone());
        }
        self
    }

    /// Convert to environment variable map for process execution
    pub fn to_env_map(&self) -> EnvMap {
        let mut env = HashMap::new();

        env.insert(ENV_LANGUAGE.to_string(), self.language.clone());
        env.insert(ENV_ROOT.to_string(), self.project_root.display().to_string());
        env.insert(ENV_SRCDIR.to_string(), self.srcdir.display().to_string());
        env.insert(ENV_OUTDIR.to_string(), self.outdir.display().to_string());
        env.insert(ENV_JOBS.to_string(), self.jobs.to_string());

        // Extra variables may override the defaults above
        for (key, value) in &self.extra_env {
            env.insert(key.clone(), value.clone());
        }

        env
    }

    /// Check that the environment can be handed to a process
    pub fn validate(&self) -> Result<(), EnvError> {
        if self.language.is_empty() {
            return Err(EnvError::MissingVariable(ENV_LANGUAGE.to_string()));
        }
        if self.jobs == 0 {
            return Err(EnvError::InvalidValue {
                variable: ENV_JOBS.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        for key in self.extra_env.keys() {
            if key.is_empty() || key.contains('=') || key.contains('\0') {
                return Err(EnvError::InvalidValue {
                    variable: key.clone(),
                    reason: "not a valid environment variable name".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Substitute host environment variables in a string using ${VAR} syntax.
///
/// Unset variables expand to the empty string.
pub fn substitute_env_vars(input: &str) -> Result<String, String> {
    substitute_vars_with(input, |name| std::env::var(name).ok())
}

/// Substitute ${VAR} references using `lookup` to resolve each name.
///
/// # Examples
/// ```
/// use cdtdevel::core::build_env::substitute_vars_with;
///
/// let result = substitute_vars_with("prefix_${NAME}_suffix", |name| {
///     (name == "NAME").then(|| "hello".to_string())
/// })
/// .unwrap();
/// assert_eq!(result, "prefix_hello_suffix");
/// ```
pub fn substitute_vars_with<F>(input: &str, lookup: F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let re =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| format!("Invalid regex: {e}"))?;

    let output = re.replace_all(input, |caps: &Captures<'_>| {
        lookup(&caps[1]).unwrap_or_default()
    });

    Ok(output.into_owned())
}

/// Environment mapper backed by the loaded workspace
#[derive(Debug, Clone, Default)]
pub struct WorkspaceEnvMapper {
    environments: HashMap<String, BuildEnvironment>,
}

impl WorkspaceEnvMapper {
    /// Create an empty mapper
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the environment for one language
    #[must_use]
    pub fn with_language(mut self, env: BuildEnvironment) -> Self {
        self.environments.insert(env.language.clone(), env);
        self
    }

    /// Build environments for every language in the workspace.
    ///
    /// Workspace `[env]` values are applied first, then the language's own
    /// `[env]` table, so language values win.
    pub fn from_workspace(workspace: &Workspace) -> Self {
        workspace
            .languages()
            .iter()
            .fold(Self::new(), |mapper, spec| {
                let env = BuildEnvironment::for_language(
                    &spec.id,
                    workspace.root().to_path_buf(),
                    spec.root.clone(),
                    workspace.out_dir().join(&spec.id),
                )
                .with_jobs(workspace.jobs())
                .with_envs(&workspace.manifest().env)
                .with_envs(&spec.config.env);
                mapper.with_language(env)
            })
    }
}

impl EnvMapper for WorkspaceEnvMapper {
    fn resolve(&self, session: &Session, language: &str) -> Result<EnvMap, EnvError> {
        let env = self
            .environments
            .get(language)
            .ok_or_else(|| EnvError::UnknownLanguage {
                language: language.to_string(),
            })?;
        env.validate()?;

        let mut map = env.to_env_map();
        for key in env.extra_env.keys() {
            if let Some(value) = map.get_mut(key) {
                *value = substitute_env_vars(value).map_err(|reason| EnvError::InvalidValue {
                    variable: key.clone(),
                    reason,
                })?;
            }
        }
        map.insert(ENV_SESSION.to_string(), session.id().to_string());

        tracing::debug!(language = %language, vars = map.len(), "resolved build environment");
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn go_env() -> BuildEnvironment {
        BuildEnvironment::for_language(
            "go",
            PathBuf::from("/project"),
            PathBuf::from("/project/implementations/go"),
            PathBuf::from("/project/build/go"),
        )
    }

    // ============================================
    // Unit Tests
    // ============================================

    #[test]
    fn test_environment_creation() {
        let env = go_env();

        assert_eq!(env.language, "go");
        assert_eq!(env.srcdir, PathBuf::from("/project/implementations/go"));
        assert!(env.jobs > 0);
        assert!(env.extra_env.is_empty());
    }

    #[test]
    fn test_env_map_contains_required_variables() {
        let map = go_env().with_jobs(4).to_env_map();

        assert_eq!(map.get(ENV_LANGUAGE).unwrap(), "go");
        assert_eq!(map.get(ENV_ROOT).unwrap(), "/project");
        assert_eq!(map.get(ENV_SRCDIR).unwrap(), "/project/implementations/go");
        assert_eq!(map.get(ENV_OUTDIR).unwrap(), "/project/build/go");
        assert_eq!(map.get(ENV_JOBS).unwrap(), "4");
    }

    #[test]
    fn test_later_env_tables_win() {
        let workspace_env = BTreeMap::from([
            ("MODE".to_string(), "release".to_string()),
            ("SHARED".to_string(), "yes".to_string()),
        ]);
        let language_env = BTreeMap::from([("MODE".to_string(), "debug".to_string())]);

        let map = go_env()
            .with_envs(&workspace_env)
            .with_envs(&language_env)
            .to_env_map();

        assert_eq!(map.get("MODE").unwrap(), "debug");
        assert_eq!(map.get("SHARED").unwrap(), "yes");
    }

    #[test]
    fn test_validation_fails_for_zero_jobs() {
        let env = go_env().with_jobs(0);
        assert!(matches!(
            env.validate(),
            Err(EnvError::InvalidValue { ref variable, .. }) if variable == ENV_JOBS
        ));
    }

    #[test]
    fn test_validation_fails_for_bad_variable_name() {
        let env = go_env().with_env("BAD=NAME", "x");
        assert!(matches!(env.validate(), Err(EnvError::InvalidValue { .. })));
    }

    #[test]
    fn test_validation_fails_for_empty_language() {
        let mut env = go_env();
        env.language = String::new();
        assert_eq!(
            env.validate(),
            Err(EnvError::MissingVariable(ENV_LANGUAGE.to_string()))
        );
    }

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/dev".to_string()),
            "GOOS" => Some("linux".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_substitute_vars() {
        let result = substitute_vars_with("${HOME}/go/bin/${GOOS}", lookup).unwrap();
        assert_eq!(result, "/home/dev/go/bin/linux");
    }

    #[test]
    fn test_substitute_unset_var_is_empty() {
        let result = substitute_vars_with("a${UNSET}b", lookup).unwrap();
        assert_eq!(result, "ab");
    }

    #[test]
    fn test_substitute_reads_host_environment() {
        let path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(substitute_env_vars("${PATH}").unwrap(), path);
    }

    #[test]
    fn test_substitute_leaves_plain_text() {
        assert_eq!(substitute_env_vars("$HOME and {x}").unwrap(), "$HOME and {x}");
    }

    #[test]
    fn test_mapper_resolves_known_language() {
        let mapper = WorkspaceEnvMapper::new()
            .with_language(go_env().with_env("GOPATH", "${PATH}:/opt/go"));
        let session = Session::with_id("abc");

        let map = mapper.resolve(&session, "go").unwrap();

        let host_path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(map.get("GOPATH").unwrap(), &format!("{host_path}:/opt/go"));
        assert_eq!(map.get(ENV_SESSION).unwrap(), "abc");
    }

    #[test]
    fn test_mapper_rejects_unknown_language() {
        let mapper = WorkspaceEnvMapper::new().with_language(go_env());
        let err = mapper.resolve(&Session::new(), "rust").unwrap_err();
        assert_eq!(
            err,
            EnvError::UnknownLanguage {
                language: "rust".to_string()
            }
        );
    }

    #[test]
    fn test_mapper_produces_fresh_map_per_call() {
        let mapper = WorkspaceEnvMapper::new().with_language(go_env());
        let mut first = mapper.resolve(&Session::new(), "go").unwrap();
        first.insert("LEAK".to_string(), "1".to_string());

        let second = mapper.resolve(&Session::new(), "go").unwrap();
        assert!(!second.contains_key("LEAK"));
    }

    // ============================================
    // Property-Based Tests
    // ============================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every resolved environment carries the core variables
        #[test]
        fn prop_environment_contains_core_variables(
            language in "[a-z][a-z0-9_-]{0,10}",
            jobs in 1usize..=64,
        ) {
            let env = BuildEnvironment::for_language(
                &language,
                PathBuf::from("/p"),
                PathBuf::from(format!("/p/{language}")),
                PathBuf::from(format!("/p/build/{language}")),
            )
            .with_jobs(jobs);

            prop_assert!(env.validate().is_ok());
            let map = env.to_env_map();
            prop_assert_eq!(map.get(ENV_LANGUAGE).unwrap(), &language);
            prop_assert_eq!(map.get(ENV_JOBS).unwrap(), &jobs.to_string());
            prop_assert!(map.contains_key(ENV_ROOT));
            prop_assert!(map.contains_key(ENV_SRCDIR));
            prop_assert!(map.contains_key(ENV_OUTDIR));
        }

        /// Extra environment variables are preserved
        #[test]
        fn prop_extra_env_preserved(
            key in "[A-Z_]{1,10}",
            value in "[a-zA-Z0-9_/.]{1,20}",
        ) {
            let map = go_env().with_env(&key, &value).to_env_map();
            prop_assert_eq!(map.get(&key).unwrap(), &value);
        }
    }
}
