//! Core business logic module
//!
//! Task processes and file writes belong in [`crate::infra`]; core only reads
//! configuration and the host environment.
//!
//! # Submodules
//!
//! - [`session`] - Per-invocation build context
//! - [`language`] - Language entries, task descriptors and the task runner trait
//! - [`registry`] - Thread-safe language registry
//! - [`build_env`] - Environment mapping for language builds
//! - [`builder`] - Build orchestration logic
//! - [`workspace`] - Manifest (cdtdevel.toml) parsing and language discovery

pub mod build_env;
pub mod builder;
pub mod language;
pub mod registry;
pub mod session;
pub mod workspace;
