//! Filesystem operations
//!
//! Handles file and directory operations.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Append bytes to a file, creating it and its parent directories
pub fn append_file(path: &Path, content: &[u8]) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(content))
        .map_err(|e| FilesystemError::AppendFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// List the immediate subdirectories of a directory, sorted by path
pub fn list_dirs(path: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
    let read_dir_error = |e: std::io::Error| FilesystemError::ReadDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(path).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}
