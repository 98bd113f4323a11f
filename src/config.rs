//! Configuration types for checksum-coverage
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default manifest filename
pub const DEFAULT_MANIFEST: &str = "all.sha1";

/// Minimum progress interval in seconds
const MIN_INTERVAL_SECS: u64 = 1;

/// Find directories with no checksum manifest, or with more than one in their ancestry
#[derive(Parser, Debug, Clone)]
#[command(
    name = "checksum-coverage",
    version,
    about = "Find directories with no checksum manifest, or with more than one in their ancestry",
    long_about = "Walks a directory tree looking for a checksum manifest file in every directory.\n\n\
                  Reports directories covered by more than one manifest along their path from the\n\
                  search root, and directories or files left without any manifest. Only the\n\
                  presence of the manifest is checked, never its contents.\n\n\
                  The report is meant for people, not for parsing.",
    after_help = "EXAMPLES:\n    \
        checksum-coverage /archive\n    \
        checksum-coverage /archive -f MD5SUMS\n    \
        checksum-coverage /archive --ignore-root      # root manifest is a catalog\n    \
        checksum-coverage /archive --no-multi-coverage --exclude '\\.snapshot'"
)]
pub struct CliArgs {
    /// Root directory to start traversal (default: current working directory)
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Checksum manifest filename to look for in every directory
    #[arg(short = 'f', long, default_value = DEFAULT_MANIFEST, value_name = "NAME")]
    pub filename: String,

    /// Do not count a manifest in the search root towards coverage
    #[arg(short = 'i', long)]
    pub ignore_root: bool,

    /// Stop descending at the first manifest on each branch
    #[arg(short = 'n', long)]
    pub no_multi_coverage: bool,

    /// Skip directories whose path matches pattern (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Seconds between progress lines
    #[arg(long, default_value = "1", value_name = "SECS")]
    pub interval: u64,

    /// Quiet mode - no header and no progress lines
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Search root
    pub root: PathBuf,

    /// Manifest filename, compared case-sensitively
    pub manifest_name: String,

    /// Root manifest does not count towards coverage
    pub ignore_root: bool,

    /// Stop at the first counted manifest on each branch
    pub stop_on_first: bool,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Progress sampling interval
    pub progress_interval: Duration,

    /// Show header and progress lines
    pub show_progress: bool,
}

impl AuditConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let root = match args.directory {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(|_| ConfigError::RootNotFound {
                path: PathBuf::from("."),
            })?,
        };

        validate_root(&root)?;
        validate_manifest_name(&args.filename)?;

        if args.interval < MIN_INTERVAL_SECS {
            return Err(ConfigError::InvalidInterval {
                secs: args.interval,
                min: MIN_INTERVAL_SECS,
            });
        }

        // Compile exclude patterns
        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root,
            manifest_name: args.filename,
            ignore_root: args.ignore_root,
            stop_on_first: args.no_multi_coverage,
            exclude_patterns,
            progress_interval: Duration::from_secs(args.interval),
            show_progress: !args.quiet,
        })
    }
}

fn validate_root(root: &Path) -> Result<(), ConfigError> {
    // metadata follows symlinks, so a symlinked root is accepted
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::RootNotDirectory {
            path: root.to_path_buf(),
        }),
        Err(_) => Err(ConfigError::RootNotFound {
            path: root.to_path_buf(),
        }),
    }
}

fn validate_manifest_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must be a file name")
    } else if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        Some("must not contain a path separator")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidManifestName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
