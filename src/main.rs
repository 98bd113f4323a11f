//! checksum-coverage - Checksum Manifest Coverage Auditor
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use checksum_coverage::config::{AuditConfig, CliArgs};
use checksum_coverage::progress::{print_header, print_summary, ProgressMonitor};
use checksum_coverage::report::StdoutSink;
use checksum_coverage::walker::{CoverageWalker, WalkCounters, WalkOptions};
use clap::Parser;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = AuditConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        let header = print_header(
            &mut io::stdout().lock(),
            &config.root.display().to_string(),
            &config.manifest_name,
            config.ignore_root,
            config.stop_on_first,
        );
        if let Err(e) = header {
            debug!("Could not print header: {}", e);
        }
    }

    let counters = Arc::new(WalkCounters::new());

    let monitor = if config.show_progress {
        Some(
            ProgressMonitor::start(Arc::clone(&counters), config.progress_interval)
                .context("Failed to start progress monitor")?,
        )
    } else {
        None
    };

    let mut walker = CoverageWalker::new(
        WalkOptions::from(&config),
        Arc::clone(&counters),
        StdoutSink,
    );
    let summary = walker.audit(&config.root);

    // Totals are read only once the monitor is gone
    if let Some(m) = monitor {
        m.stop();
    }
    let dirs = counters.dirs_visited();
    let manifests = counters.manifests_found();
    let errors = counters.errors();

    let printed = print_summary(
        &mut io::stdout().lock(),
        dirs,
        manifests,
        errors,
        summary.duration,
    );
    if let Err(e) = printed {
        debug!("Could not print summary: {}", e);
    }

    if errors > 0 {
        info!(errors, "Audit completed with unreadable directories");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("checksum_coverage=debug,warn")
    } else {
        EnvFilter::new("checksum_coverage=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
