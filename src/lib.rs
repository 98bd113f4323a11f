//! checksum-coverage - Checksum Manifest Coverage Auditor
//!
//! Walks an archival directory tree and checks, for a chosen manifest
//! filename (`all.sha1` by default), which directories are covered by a
//! manifest in themselves or an ancestor. Only the presence of the
//! manifest matters; its contents are never read.
//!
//! # Report
//!
//! - **Multiple coverage**: a directory holds a manifest while an ancestor
//!   already does.
//! - **Uncovered `[ ]`**: the topmost directory of a region with no
//!   manifest. Reported once per region.
//! - **Uncovered `[*]`**: a manifest-free directory or file inside a
//!   subtree that is covered elsewhere. Reported only once the enclosing
//!   subtree is known to contain a manifest.
//!
//! Unreadable directories are reported and skipped; the walk always runs
//! to completion.
//!
//! # Example
//!
//! ```bash
//! # Basic audit
//! checksum-coverage /archive
//!
//! # Root manifest is a catalog, not a coverage claim
//! checksum-coverage /archive --ignore-root
//!
//! # Stop at the first manifest on every branch
//! checksum-coverage /archive --no-multi-coverage
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod walker;

pub use config::{AuditConfig, CliArgs};
pub use error::{ConfigError, ScanError};
pub use report::{Diagnostic, ReportSink, StdoutSink};
pub use walker::{AuditSummary, CoverageWalker, SubtreeStatus, WalkCounters, WalkOptions};
