//! Progress reporting for the coverage walker
//!
//! A background thread samples the shared counters and prints a status
//! line at a fixed interval. The numbers it shows are advisory; only the
//! summary printed after the walk is authoritative.

use crate::walker::WalkCounters;
use console::style;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// How often the monitor thread checks the stop flag
const TICK: Duration = Duration::from_millis(100);

/// Background status printer
pub struct ProgressMonitor {
    /// Stop signal
    stop: Arc<AtomicBool>,

    /// Monitor thread
    handle: Option<JoinHandle<()>>,
}

impl ProgressMonitor {
    /// Start printing status lines to standard output
    pub fn start(counters: Arc<WalkCounters>, interval: Duration) -> io::Result<Self> {
        Self::start_with_writer(counters, interval, io::stdout())
    }

    /// Start printing status lines to `out`
    pub fn start_with_writer<W>(
        counters: Arc<WalkCounters>,
        interval: Duration,
        mut out: W,
    ) -> io::Result<Self>
    where
        W: Write + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("progress".to_string())
            .spawn(move || {
                let mut last = Instant::now();
                while !thread_stop.load(Ordering::Relaxed) {
                    thread::sleep(TICK);
                    if thread_stop.load(Ordering::Relaxed) {
                        break;
                    }
                    if last.elapsed() < interval {
                        continue;
                    }
                    last = Instant::now();

                    let line = status_line(&counters);
                    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
                        debug!("Progress output closed, monitor exiting");
                        break;
                    }
                }
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the monitor and wait for its thread
    ///
    /// Returns within one tick; no status line is printed after this.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn status_line(counters: &WalkCounters) -> String {
    let progress = counters.progress();
    let current = progress
        .current_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "...".to_string());

    format!(
        "Visited {} dirs, found {} manifests, currently at {} ({:.0} dirs/s)",
        format_number(progress.dirs_visited),
        format_number(progress.manifests_found),
        current,
        progress.dirs_per_second(),
    )
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the audit
pub fn print_summary<W: Write>(
    out: &mut W,
    dirs: u64,
    manifests: u64,
    errors: u64,
    duration: Duration,
) -> io::Result<()> {
    let duration_secs = duration.as_secs_f64();

    writeln!(out)?;
    writeln!(out, "{}", style("Traversal completed").green().bold())?;
    writeln!(out, "{}", style("─".repeat(50)).dim())?;
    writeln!(
        out,
        "  {} {}",
        style("Total visited directories:").bold(),
        format_number(dirs)
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Total found checksums:    ").bold(),
        format_number(manifests)
    )?;
    if errors > 0 {
        writeln!(
            out,
            "  {} {}",
            style("Unreadable directories:   ").yellow().bold(),
            format_number(errors)
        )?;
    }
    writeln!(
        out,
        "  {} {:.2} s",
        style("Duration:                 ").bold(),
        duration_secs
    )?;
    writeln!(out)?;
    out.flush()
}

/// Print a header at the start of the audit
pub fn print_header<W: Write>(
    out: &mut W,
    root: &str,
    manifest: &str,
    ignore_root: bool,
    stop_on_first: bool,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{} {}",
        style("checksum-coverage").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "{}", style("─".repeat(50)).dim())?;
    writeln!(out, "  {} {}", style("Starting scan from:").bold(), root)?;
    writeln!(out, "  {} {}", style("Looking for:").bold(), manifest)?;
    writeln!(out, "  {} {}", style("Ignore root:").bold(), ignore_root)?;
    writeln!(out, "  {} {}", style("Stop at first manifest:").bold(), stop_on_first)?;
    writeln!(out)?;
    out.flush()
}
