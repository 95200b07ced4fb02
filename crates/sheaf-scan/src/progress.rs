//! Walk progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Progress information during a walk.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Regular files seen so far.
    pub files_seen: u64,
    /// Directories entered so far.
    pub dirs_seen: u64,
    /// Files that passed the filter.
    pub files_accepted: u64,
    /// Directories skipped without descending.
    pub dirs_pruned: u64,
    /// Most recent path.
    pub current_path: PathBuf,
    /// Time elapsed since the walk started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_seen: 0,
            dirs_seen: 0,
            files_accepted: 0,
            dirs_pruned: 0,
            current_path: PathBuf::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate walk rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_seen as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Files rejected by the filter so far.
    pub fn files_filtered(&self) -> u64 {
        self.files_seen - self.files_accepted
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    files_seen: u64,
    dirs_seen: u64,
    files_accepted: u64,
    current_path: PathBuf,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            files_seen: 0,
            dirs_seen: 0,
            files_accepted: 0,
            current_path: PathBuf::new(),
        }
    }

    pub fn record_file(&mut self, path: PathBuf, accepted: bool) {
        self.files_seen += 1;
        if accepted {
            self.files_accepted += 1;
        }
        self.current_path = path;
    }

    pub fn record_dir(&mut self) {
        self.dirs_seen += 1;
    }

    pub fn files_seen(&self) -> u64 {
        self.files_seen
    }

    pub fn files_accepted(&self) -> u64 {
        self.files_accepted
    }

    pub fn snapshot(&self, dirs_pruned: u64) -> ScanProgress {
        ScanProgress {
            files_seen: self.files_seen,
            dirs_seen: self.dirs_seen,
            files_accepted: self.files_accepted,
            dirs_pruned,
            current_path: self.current_path.clone(),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
