//! Coverage walker
//!
//! Single-threaded depth-first walk that tracks how many counted manifests
//! lie on the path from the search root to each directory.
//!
//! Two mechanisms keep the report short:
//!
//! - **Suppression**: an uncovered directory is announced once, at the top
//!   of its uncovered region. Its descendants inherit a suppressed flag
//!   until a directory with its own manifest clears it.
//! - **Deferred batches**: while listing the children of a directory with
//!   no coverage, manifest-free children (with content) and plain files are
//!   staged. The batch is printed only if a counted manifest turns up
//!   somewhere in that directory's subtree, otherwise it is dropped.
//!
//! ```text
//! visit(dir)
//! ├── count manifest, maybe report multiple coverage
//! ├── maybe report "uncovered [ ]" and suppress below
//! ├── for each child (sorted by name)
//! │     dir  → visit(child), stage if uncovered with entries
//! │     file → stage if no coverage here
//! └── subtree covered? flush staged as "[*]" : drop
//! ```

use crate::config::AuditConfig;
use crate::error::ScanError;
use crate::report::{Diagnostic, ReportSink};
use crate::walker::counters::WalkCounters;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-run walk settings
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Manifest filename, compared case-sensitively
    pub manifest_name: String,
    /// Root manifest does not count towards coverage
    pub ignore_root: bool,
    /// Treat the first counted manifest on a branch as terminal
    pub stop_on_first: bool,
    /// Directories matching any pattern are skipped entirely
    pub exclude: Vec<Regex>,
}

impl WalkOptions {
    pub fn new(manifest_name: impl Into<String>) -> Self {
        Self {
            manifest_name: manifest_name.into(),
            ignore_root: false,
            stop_on_first: false,
            exclude: Vec::new(),
        }
    }

    pub fn ignore_root(mut self, ignore_root: bool) -> Self {
        self.ignore_root = ignore_root;
        self
    }

    pub fn stop_on_first(mut self, stop_on_first: bool) -> Self {
        self.stop_on_first = stop_on_first;
        self
    }

    pub fn exclude(mut self, pattern: Regex) -> Self {
        self.exclude.push(pattern);
        self
    }

    /// Check if a directory should be skipped
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let path = path.to_string_lossy();
        self.exclude.iter().any(|re| re.is_match(&path))
    }
}

impl From<&AuditConfig> for WalkOptions {
    fn from(config: &AuditConfig) -> Self {
        Self {
            manifest_name: config.manifest_name.clone(),
            ignore_root: config.ignore_root,
            stop_on_first: config.stop_on_first,
            exclude: config.exclude_patterns.clone(),
        }
    }
}

/// What a visited directory tells its parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtreeStatus {
    /// A counted manifest exists in this directory or below
    pub covered: bool,
    /// This directory or a descendant holds at least one entry
    pub has_entries: bool,
}

impl SubtreeStatus {
    fn absorb(&mut self, child: SubtreeStatus) {
        self.covered |= child.covered;
        self.has_entries |= child.has_entries;
    }
}

/// Totals for a finished audit
#[derive(Debug, Clone, Default)]
pub struct AuditSummary {
    pub dirs_visited: u64,
    pub manifests_found: u64,
    pub errors: u64,
    pub duration: Duration,
    /// Status of the search root itself
    pub root: SubtreeStatus,
}

/// Findings staged while listing one directory
#[derive(Debug, Default)]
struct DeferredBatch {
    dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl DeferredBatch {
    fn flush<S: ReportSink>(self, sink: &mut S) {
        for path in self.dirs {
            sink.report(Diagnostic::UncoveredException { path });
        }
        for path in self.files {
            sink.report(Diagnostic::UncoveredFile { path });
        }
    }
}

/// A child of the directory being listed
struct Child {
    path: PathBuf,
    is_dir: bool,
}

/// Recursive coverage walker
pub struct CoverageWalker<S: ReportSink> {
    options: WalkOptions,
    counters: Arc<WalkCounters>,
    sink: S,
}

impl<S: ReportSink> CoverageWalker<S> {
    pub fn new(options: WalkOptions, counters: Arc<WalkCounters>, sink: S) -> Self {
        Self {
            options,
            counters,
            sink,
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Walk the tree under `root` and return the final totals
    pub fn audit(&mut self, root: &Path) -> AuditSummary {
        info!(
            root = %root.display(),
            manifest = %self.options.manifest_name,
            ignore_root = self.options.ignore_root,
            stop_on_first = self.options.stop_on_first,
            "Starting coverage walk"
        );

        let root_status = self.walk(root, 0, true, false);

        let summary = AuditSummary {
            dirs_visited: self.counters.dirs_visited(),
            manifests_found: self.counters.manifests_found(),
            errors: self.counters.errors(),
            duration: self.counters.elapsed(),
            root: root_status,
        };

        info!(
            dirs = summary.dirs_visited,
            manifests = summary.manifests_found,
            errors = summary.errors,
            "Coverage walk finished"
        );

        summary
    }

    /// Visit one directory and everything below it
    ///
    /// `coverage_count` is the number of counted manifests in the
    /// ancestors of `dir`. `report_suppressed` is set when an ancestor was
    /// already announced as the top of an uncovered region.
    pub fn walk(
        &mut self,
        dir: &Path,
        mut coverage_count: u32,
        is_root: bool,
        mut report_suppressed: bool,
    ) -> SubtreeStatus {
        self.counters.record_visit(dir);
        debug!(path = %dir.display(), coverage = coverage_count, "Visiting");

        let manifest = dir.join(&self.options.manifest_name);
        let found = is_manifest_file(&manifest);
        if found {
            self.counters.record_manifest();
        }

        let exempt_root = is_root && self.options.ignore_root;
        let counted = found && !exempt_root;

        if found && exempt_root {
            self.sink.report(Diagnostic::RootManifestExcluded { manifest });
        }

        if counted {
            if self.options.stop_on_first {
                // Handled branch: invisible to the parent's bookkeeping
                return SubtreeStatus::default();
            }
            coverage_count += 1;
            report_suppressed = false;

            if coverage_count > 1 {
                self.sink.report(Diagnostic::MultipleCoverage {
                    count: coverage_count,
                    path: dir.to_path_buf(),
                });
            }
        }

        if !found && !report_suppressed && coverage_count == 0 {
            self.sink.report(Diagnostic::Uncovered {
                path: dir.to_path_buf(),
            });
            if exempt_root {
                self.sink.report(Diagnostic::RootNotCounted);
            } else {
                report_suppressed = true;
            }
        }

        let mut status = SubtreeStatus {
            covered: counted,
            has_entries: false,
        };

        let (children, listing_error) = self.list_children(dir);
        let mut batch = DeferredBatch::default();

        for child in children {
            if child.is_dir {
                if self.options.is_excluded(&child.path) {
                    debug!(path = %child.path.display(), "Excluded");
                    continue;
                }

                let child_status =
                    self.walk(&child.path, coverage_count, false, report_suppressed);
                status.absorb(child_status);

                if coverage_count == 0 && !child_status.covered && child_status.has_entries {
                    batch.dirs.push(child.path);
                }
            } else {
                status.has_entries = true;
                if coverage_count == 0 {
                    batch.files.push(child.path);
                }
            }
        }

        if let Some(error) = listing_error {
            // Incomplete listing: the staged batch cannot be trusted
            self.report_scan_error(error);
            return status;
        }

        if status.covered {
            batch.flush(&mut self.sink);
        }

        status
    }

    /// Children of `dir` sorted by name, plus the error that cut the listing short
    fn list_children(&self, dir: &Path) -> (Vec<Child>, Option<ScanError>) {
        let read_dir = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) => return (Vec::new(), Some(ScanError::from_io(dir, &e))),
        };

        let mut children = Vec::new();
        let mut error = None;

        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error = Some(ScanError::from_io(dir, &e));
                    break;
                }
            };

            // file_type does not follow symlinks
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    error = Some(ScanError::from_io(dir, &e));
                    break;
                }
            };

            children.push(Child {
                is_dir: file_type.is_dir(),
                path: entry.path(),
            });
        }

        children.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        (children, error)
    }

    fn report_scan_error(&mut self, error: ScanError) {
        warn!("{}", error);
        self.counters.record_error();
        self.sink.report(Diagnostic::ScanFailed { error });
    }
}

/// Manifest presence follows symlinks
fn is_manifest_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
