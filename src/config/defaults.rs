//! Default configuration values

/// Project manifest file name
pub const MANIFEST_FILE: &str = "cdtdevel.toml";

/// Per-language configuration file name
pub const LANGUAGE_FILE: &str = "language.toml";

/// Default output directory, relative to the project root
pub const DEFAULT_OUT_DIR: &str = "build";

/// Build logs directory, relative to the output directory
pub const LOGS_DIR: &str = "logs";

/// Build target that selects every registered language
pub const ALL_TARGET: &str = "all";

/// Number of trailing stderr lines kept in task failure messages
pub const STDERR_TAIL_LINES: usize = 20;


/// Language identifier
pub const ENV_LANGUAGE: &str = "CDT_LANGUAGE";

/// Project root directory
pub const ENV_ROOT: &str = "CDT_ROOT";

/// Language source directory
pub const ENV_SRCDIR: &str = "CDT_SRCDIR";

/// Language output directory
pub const ENV_OUTDIR: &str = "CDT_OUTDIR";

/// Number of parallel jobs
pub const ENV_JOBS: &str = "CDT_JOBS";

/// Build session identifier
pub const ENV_SESSION: &str = "CDT_SESSION";
