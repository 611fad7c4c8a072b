//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying spinners, status
//! messages and errors to the user.

use indicatif::{ProgressBar, ProgressStyle};

/// Output settings from the global CLI flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything except errors
    pub quiet: bool,
    /// Machine-readable JSON output
    pub json: bool,
    /// Verbosity level (-v, -vv)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create output settings
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Default tracing filter directive for these settings
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Whether human-readable progress should be shown
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Create a spinner for operations with unknown duration.
///
/// Hidden when progress output is disabled.
pub fn create_spinner(message: &str, output: OutputConfig) -> ProgressBar {
    if !output.show_progress() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directive_follows_verbosity() {
        assert_eq!(OutputConfig::new(false, false, 0).log_directive(), "warn");
        assert_eq!(OutputConfig::new(false, false, 1).log_directive(), "info");
        assert_eq!(OutputConfig::new(false, false, 3).log_directive(), "debug");
        assert_eq!(OutputConfig::new(true, false, 2).log_directive(), "error");
    }

    #[test]
    fn test_progress_hidden_for_json_and_quiet() {
        assert!(OutputConfig::new(false, false, 0).show_progress());
        assert!(!OutputConfig::new(true, false, 0).show_progress());
        assert!(!OutputConfig::new(false, true, 0).show_progress());
        assert!(create_spinner("x", OutputConfig::new(true, false, 0)).is_hidden());
    }
}
