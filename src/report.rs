//! Report lines emitted by the coverage walker
//!
//! Every finding is a [`Diagnostic`]. The walker hands them to a
//! [`ReportSink`] as soon as they are final; deferred findings only reach
//! the sink once the enclosing subtree is known to be covered.
//!
//! The rendered lines are for people. They are not a stable format.

use crate::error::ScanError;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

/// A single line of the coverage report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Manifest at the search root is excluded from coverage accounting
    RootManifestExcluded { manifest: PathBuf },

    /// Directory holds a manifest while an ancestor already does
    MultipleCoverage { count: u32, path: PathBuf },

    /// Topmost directory of a region with no manifest
    Uncovered { path: PathBuf },

    /// Follows `Uncovered` when the uncovered directory is the exempted root
    RootNotCounted,

    /// Manifest-free directory inside a subtree that is covered elsewhere
    UncoveredException { path: PathBuf },

    /// Plain file inside a subtree that is covered elsewhere
    UncoveredFile { path: PathBuf },

    /// Directory could not be listed
    ScanFailed { error: ScanError },
}

impl Diagnostic {
    /// Path this line is about, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Diagnostic::RootManifestExcluded { manifest } => Some(manifest),
            Diagnostic::MultipleCoverage { path, .. }
            | Diagnostic::Uncovered { path }
            | Diagnostic::UncoveredException { path }
            | Diagnostic::UncoveredFile { path } => Some(path),
            Diagnostic::RootNotCounted => None,
            Diagnostic::ScanFailed { error } => Some(error.path()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RootManifestExcluded { manifest } => write!(
                f,
                "Checksum found in search root, will be ignored from coverage accounting: {}",
                manifest.display()
            ),
            Diagnostic::MultipleCoverage { count, path } => {
                write!(f, "Multiple ({} x) coverage for directory {}", count, path.display())
            }
            Diagnostic::Uncovered { path } => {
                write!(f, "Uncovered directory [ ] {}", path.display())
            }
            Diagnostic::RootNotCounted => {
                write!(f, "  This is the search root, will not count in multiple coverage")
            }
            Diagnostic::UncoveredException { path } => {
                write!(f, "Uncovered directory [*] {}", path.display())
            }
            Diagnostic::UncoveredFile { path } => {
                write!(f, "Uncovered file      [*] {}", path.display())
            }
            Diagnostic::ScanFailed { error } => {
                write!(f, "Error at: {}: {}", error.path().display(), error.reason())
            }
        }
    }
}

/// Destination for report lines
pub trait ReportSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics in order
impl ReportSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Writes one line per diagnostic to standard output
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        let mut out = io::stdout().lock();
        // A closed stdout (e.g. `| head`) must not abort the audit
        let _ = writeln!(out, "{}", diagnostic);
    }
}
