//! cdtdevel - Multi-language build orchestrator
//!
//! This library drives the builds of the Cryptdatum implementations, one
//! language at a time or all registered languages at once.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Language registry, environment mapping and build orchestration
//! - [`infra`] - Infrastructure layer (filesystem, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
