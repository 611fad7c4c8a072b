//! Infrastructure layer
//!
//! Handles I/O operations: filesystem access and external processes.
//! Task processes are only ever started from here.

pub mod filesystem;
pub mod shell;
