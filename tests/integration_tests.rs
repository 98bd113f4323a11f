//! Integration tests for checksum-coverage
//!
//! Each test builds a small tree in a temp dir and audits it end to end.

use checksum_coverage::config::{AuditConfig, CliArgs};
use checksum_coverage::report::{Diagnostic, ReportSink};
use checksum_coverage::walker::{AuditSummary, CoverageWalker, WalkCounters, WalkOptions};
use clap::Parser;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

/// root/{all.sha1, a/{all.sha1}, b/{}, c/{x.txt}}
fn sample_tree() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    File::create(root.join("all.sha1")).unwrap();
    fs::create_dir(root.join("a")).unwrap();
    File::create(root.join("a/all.sha1")).unwrap();
    fs::create_dir(root.join("b")).unwrap();
    fs::create_dir(root.join("c")).unwrap();
    File::create(root.join("c/x.txt")).unwrap();
    dir
}

fn audit(root: &Path, options: WalkOptions) -> (Vec<Diagnostic>, AuditSummary) {
    let mut walker = CoverageWalker::new(options, Arc::new(WalkCounters::new()), Vec::new());
    let summary = walker.audit(root);
    (walker.into_sink(), summary)
}

fn audit_with_args(root: &Path, extra: &[&str]) -> (Vec<Diagnostic>, AuditSummary) {
    let mut argv = vec!["checksum-coverage", root.to_str().unwrap()];
    argv.extend_from_slice(extra);
    let config = AuditConfig::from_args(CliArgs::parse_from(argv)).unwrap();
    audit(&config.root, WalkOptions::from(&config))
}

#[test]
fn test_sample_tree_defaults() {
    let dir = sample_tree();
    let (lines, summary) = audit_with_args(dir.path(), &[]);

    assert_eq!(
        lines,
        vec![Diagnostic::MultipleCoverage {
            count: 2,
            path: dir.path().join("a"),
        }]
    );
    assert_eq!(
        lines[0].to_string(),
        format!("Multiple (2 x) coverage for directory {}", dir.path().join("a").display())
    );
    assert_eq!(summary.dirs_visited, 4);
    assert_eq!(summary.manifests_found, 2);
    assert_eq!(summary.errors, 0);
}

#[test]
fn test_sample_tree_ignore_root() {
    let dir = sample_tree();
    let (lines, summary) = audit_with_args(dir.path(), &["--ignore-root"]);

    assert_eq!(summary.manifests_found, 2);
    assert_eq!(
        lines[0],
        Diagnostic::RootManifestExcluded {
            manifest: dir.path().join("all.sha1"),
        }
    );

    // a is the only counted manifest: no multiplicity
    assert!(!lines
        .iter()
        .any(|d| matches!(d, Diagnostic::MultipleCoverage { .. })));

    // c is flagged at the top level, and again as an exception because
    // a makes the root subtree covered
    assert!(lines.contains(&Diagnostic::Uncovered {
        path: dir.path().join("c"),
    }));
    assert!(lines.contains(&Diagnostic::UncoveredException {
        path: dir.path().join("c"),
    }));

    // b has no entries and is never staged as an exception
    assert!(!lines.contains(&Diagnostic::UncoveredException {
        path: dir.path().join("b"),
    }));

    // The uncounted root manifest is the root's only plain file
    let files: Vec<&Diagnostic> = lines
        .iter()
        .filter(|d| matches!(d, Diagnostic::UncoveredFile { .. }))
        .collect();
    assert_eq!(
        files,
        vec![&Diagnostic::UncoveredFile {
            path: dir.path().join("all.sha1"),
        }]
    );
}

#[test]
fn test_sample_tree_no_multi_coverage() {
    let dir = sample_tree();
    let (lines, summary) = audit_with_args(dir.path(), &["--no-multi-coverage"]);

    // Root manifest is authoritative: nothing below it is visited
    assert!(lines.is_empty(), "{lines:?}");
    assert_eq!(summary.dirs_visited, 1);
    assert_eq!(summary.manifests_found, 1);
    assert!(!summary.root.covered);
}

#[test]
fn test_ignore_root_and_no_multi_coverage_with_root_only_manifest() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    File::create(root.join("all.sha1")).unwrap();
    fs::create_dir_all(root.join("a/deep")).unwrap();
    File::create(root.join("a/deep/data.bin")).unwrap();
    fs::create_dir(root.join("b")).unwrap();
    File::create(root.join("b/data.bin")).unwrap();

    let (lines, summary) = audit_with_args(root, &["--ignore-root", "--no-multi-coverage"]);

    // Exemption applies before early stop: the root is still descended
    assert_eq!(summary.dirs_visited, 4);
    assert_eq!(
        lines,
        vec![
            Diagnostic::RootManifestExcluded {
                manifest: root.join("all.sha1"),
            },
            Diagnostic::Uncovered {
                path: root.join("a"),
            },
            Diagnostic::Uncovered {
                path: root.join("b"),
            },
        ]
    );
}

#[test]
fn test_exception_inside_uncovered_region() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let top = root.join("projects");
    fs::create_dir_all(top.join("done")).unwrap();
    File::create(top.join("done/all.sha1")).unwrap();
    File::create(top.join("done/result.csv")).unwrap();
    fs::create_dir_all(top.join("pending")).unwrap();
    File::create(top.join("pending/draft.csv")).unwrap();
    File::create(top.join("index.txt")).unwrap();
    File::create(root.join("all.sha1.bak")).unwrap();

    let (lines, _) = audit(root, WalkOptions::new("all.sha1"));

    let expected: Vec<Diagnostic> = vec![
        Diagnostic::Uncovered {
            path: root.to_path_buf(),
        },
        Diagnostic::UncoveredException {
            path: top.join("pending"),
        },
        Diagnostic::UncoveredFile {
            path: top.join("index.txt"),
        },
        Diagnostic::UncoveredFile {
            path: root.join("all.sha1.bak"),
        },
    ];
    assert_eq!(lines, expected);
}

#[test]
fn test_custom_manifest_name() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    File::create(root.join("MD5SUMS")).unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    File::create(root.join("sub/MD5SUMS")).unwrap();
    File::create(root.join("sub/all.sha1")).unwrap();

    let (lines, summary) = audit_with_args(root, &["-f", "MD5SUMS"]);

    assert_eq!(summary.manifests_found, 2);
    assert_eq!(
        lines,
        vec![Diagnostic::MultipleCoverage {
            count: 2,
            path: root.join("sub"),
        }]
    );
}

#[test]
fn test_exclude_flag() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join(".snapshot/hourly.0")).unwrap();
    File::create(root.join(".snapshot/hourly.0/data")).unwrap();
    fs::create_dir(root.join("live")).unwrap();
    File::create(root.join("live/all.sha1")).unwrap();

    let (lines, summary) = audit_with_args(root, &["--exclude", r"/\.snapshot$"]);

    assert_eq!(summary.dirs_visited, 2);
    let flagged: Vec<&PathBuf> = lines.iter().filter_map(|d| d.path()).collect();
    assert!(flagged.iter().all(|p| !p.to_string_lossy().contains(".snapshot")));
}

/// Removes `victim` from disk when `trigger` is reported, after the parent
/// listing already holds it
struct RemovingSink {
    lines: Vec<Diagnostic>,
    trigger: Diagnostic,
    victim: PathBuf,
}

impl ReportSink for RemovingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic == self.trigger {
            fs::remove_dir_all(&self.victim).unwrap();
        }
        self.lines.push(diagnostic);
    }
}

#[test]
fn test_vanished_directory_does_not_stop_walk() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    File::create(root.join("all.sha1")).unwrap();
    fs::create_dir(root.join("a")).unwrap();
    File::create(root.join("a/all.sha1")).unwrap();
    fs::create_dir(root.join("b")).unwrap();
    File::create(root.join("b/data.bin")).unwrap();
    fs::create_dir(root.join("c")).unwrap();
    File::create(root.join("c/all.sha1")).unwrap();

    let sink = RemovingSink {
        lines: Vec::new(),
        trigger: Diagnostic::MultipleCoverage {
            count: 2,
            path: root.join("a"),
        },
        victim: root.join("b"),
    };
    let mut walker = CoverageWalker::new(
        WalkOptions::new("all.sha1"),
        Arc::new(WalkCounters::new()),
        sink,
    );
    let summary = walker.audit(root);
    let lines = walker.into_sink().lines;

    assert_eq!(summary.dirs_visited, 4);
    assert_eq!(summary.errors, 1);
    assert_eq!(lines.len(), 3, "{lines:?}");
    assert_eq!(lines[1].path(), Some(&root.join("b")));
    assert!(matches!(lines[1], Diagnostic::ScanFailed { .. }));
    assert_eq!(
        lines[2],
        Diagnostic::MultipleCoverage {
            count: 2,
            path: root.join("c"),
        }
    );
}

#[test]
fn test_vanished_directory_not_staged_as_exception() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("a/x")).unwrap();
    File::create(root.join("a/all.sha1")).unwrap();
    File::create(root.join("a/x/all.sha1")).unwrap();
    fs::create_dir(root.join("b")).unwrap();
    File::create(root.join("b/data.bin")).unwrap();
    fs::create_dir(root.join("c")).unwrap();
    File::create(root.join("c/data.bin")).unwrap();

    let sink = RemovingSink {
        lines: Vec::new(),
        trigger: Diagnostic::MultipleCoverage {
            count: 2,
            path: root.join("a/x"),
        },
        victim: root.join("b"),
    };
    let mut walker = CoverageWalker::new(
        WalkOptions::new("all.sha1"),
        Arc::new(WalkCounters::new()),
        sink,
    );
    let summary = walker.audit(root);
    let lines = walker.into_sink().lines;

    // b could not be listed: no entries known, so only c is an exception
    assert_eq!(summary.errors, 1);
    assert!(lines.iter().any(|d| matches!(d, Diagnostic::ScanFailed { .. })
        && d.path() == Some(&root.join("b"))));
    let exceptions: Vec<&PathBuf> = lines
        .iter()
        .filter_map(|d| match d {
            Diagnostic::UncoveredException { path } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(exceptions, vec![&root.join("c")]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_does_not_stop_walk() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let root = dir.path();
    File::create(root.join("all.sha1")).unwrap();
    let locked = root.join("locked");
    fs::create_dir(&locked).unwrap();
    File::create(locked.join("secret")).unwrap();
    fs::create_dir(root.join("open")).unwrap();
    File::create(root.join("open/all.sha1")).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // Running with privileges that bypass permission bits
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (lines, summary) = audit(root, WalkOptions::new("all.sha1"));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(summary.errors, 1);
    assert_eq!(summary.dirs_visited, 3);
    assert!(lines.iter().any(|d| matches!(d, Diagnostic::ScanFailed { .. })
        && d.path() == Some(&locked)));
    assert!(lines.contains(&Diagnostic::MultipleCoverage {
        count: 2,
        path: root.join("open"),
    }));
}
