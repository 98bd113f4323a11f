//! Run counters shared between the walker and the progress monitor
//!
//! Only the walker writes; the monitor samples. Counts use relaxed atomics.
//! Both sides only ever `try_lock` the current path, so neither waits on
//! the other: a sample may show a stale path, and the walker may skip an
//! update while the monitor is copying it.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for a single audit run
#[derive(Debug)]
pub struct WalkCounters {
    dirs_visited: AtomicU64,
    manifests_found: AtomicU64,
    errors: AtomicU64,
    current_path: Mutex<PathBuf>,
    started: Instant,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Default)]
pub struct WalkProgress {
    pub dirs_visited: u64,
    pub manifests_found: u64,
    pub errors: u64,
    /// `None` when the walker held the path at sampling time
    pub current_path: Option<PathBuf>,
    pub elapsed: Duration,
}

impl WalkProgress {
    pub fn dirs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.dirs_visited as f64 / secs
        } else {
            0.0
        }
    }
}

impl WalkCounters {
    pub fn new() -> Self {
        Self {
            dirs_visited: AtomicU64::new(0),
            manifests_found: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            current_path: Mutex::new(PathBuf::new()),
            started: Instant::now(),
        }
    }

    pub(crate) fn record_visit(&self, path: &Path) {
        self.dirs_visited.fetch_add(1, Ordering::Relaxed);
        // Skip the update rather than wait on a sampling monitor
        if let Some(mut current) = self.current_path.try_lock() {
            current.clear();
            current.push(path);
        }
    }

    pub(crate) fn record_manifest(&self) {
        self.manifests_found.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dirs_visited(&self) -> u64 {
        self.dirs_visited.load(Ordering::Relaxed)
    }

    pub fn manifests_found(&self) -> u64 {
        self.manifests_found.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Sample without waiting on the walker
    pub fn progress(&self) -> WalkProgress {
        WalkProgress {
            dirs_visited: self.dirs_visited(),
            manifests_found: self.manifests_found(),
            errors: self.errors(),
            current_path: self.current_path.try_lock().map(|p| p.clone()),
            elapsed: self.elapsed(),
        }
    }
}

impl Default for WalkCounters {
    fn default() -> Self {
        Self::new()
    }
}
