//! Error types for checksum-coverage
//!
//! This module defines the error hierarchy for:
//! - Configuration and CLI validation
//! - Per-directory enumeration failures during the walk
//!
//! Configuration errors stop the run before any traversal begins; the
//! binary reports them through `anyhow`.
//! Enumeration errors never leave the walker: they become report lines
//! and the walk continues with the next sibling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Search root does not exist
    #[error("Search root '{path}' does not exist")]
    RootNotFound { path: PathBuf },

    /// Search root exists but is not a directory
    #[error("Search root '{path}' is not a directory")]
    RootNotDirectory { path: PathBuf },

    /// Manifest filename is empty or is a path rather than a name
    #[error("Invalid manifest filename '{name}': {reason}")]
    InvalidManifestName { name: String, reason: String },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    /// Progress interval out of range
    #[error("Invalid progress interval {secs}s: must be at least {min}s")]
    InvalidInterval { secs: u64, min: u64 },
}

/// Failure to enumerate a single directory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Permission denied
    #[error("Permission denied reading '{path}': {reason}")]
    PermissionDenied { path: PathBuf, reason: String },

    /// Any other failure while listing the directory
    #[error("Failed to read directory '{path}': {reason}")]
    ReadDirFailed { path: PathBuf, reason: String },
}

impl ScanError {
    /// Classify an I/O error raised while listing `path`
    pub fn from_io(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        let path = path.into();
        let reason = err.to_string();
        match err.kind() {
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied { path, reason },
            _ => ScanError::ReadDirFailed { path, reason },
        }
    }

    /// Returns the directory this error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            ScanError::PermissionDenied { path, .. } => path,
            ScanError::ReadDirFailed { path, .. } => path,
        }
    }

    /// Underlying I/O error text
    pub fn reason(&self) -> &str {
        match self {
            ScanError::PermissionDenied { reason, .. } => reason,
            ScanError::ReadDirFailed { reason, .. } => reason,
        }
    }
}
