//! Sorted directory walker built on jwalk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use compact_str::CompactString;
use itertools::Itertools;
use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use sheaf_core::{ScanError, ScanWarning, SnapshotConfig, WarningKind};
use sheaf_filter::FilterEngine;

use crate::progress::{ProgressTracker, ScanProgress};

/// Files between progress updates.
const PROGRESS_INTERVAL: u64 = 256;

/// A file that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Root-relative path with `/` separators.
    pub rel_path: CompactString,
    /// Absolute path on disk.
    pub path: PathBuf,
}

/// Result of a walk.
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// Canonical root that was walked.
    pub root: PathBuf,
    /// Accepted files in traversal order.
    pub candidates: Vec<Candidate>,
    /// Files rejected by the filter.
    pub filtered: u64,
    /// Directories skipped without descending.
    pub pruned_dirs: u64,
    /// Entries that could not be read.
    pub warnings: Vec<ScanWarning>,
}

/// Walks a root in sorted order, asking the filter about every file and
/// every directory before descending into it.
///
/// Entries are visited depth-first with siblings sorted by file name, so
/// two walks over an unchanged tree yield the same candidate list.
pub struct TreeWalker {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl TreeWalker {
    /// Create a new walker.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to walk progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk `config.root`, returning every file the filter accepts.
    pub fn walk(
        &self,
        config: &SnapshotConfig,
        engine: &FilterEngine,
    ) -> Result<WalkOutcome, ScanError> {
        let root = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::root(&config.root, e))?;

        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }

        let engine = Arc::new(engine.clone());
        let pruned = Arc::new(AtomicU64::new(0));

        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            1 => Parallelism::Serial,
            n => Parallelism::RayonNewPool(n),
        };

        let mut walker = WalkDir::new(&root)
            .parallelism(parallelism)
            .sort(true)
            .skip_hidden(false)
            .follow_links(config.follow_symlinks)
            .min_depth(1)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX));

        if config.prune_dirs {
            let engine = Arc::clone(&engine);
            let pruned = Arc::clone(&pruned);
            let prune_root = root.clone();
            walker = walker.process_read_dir(move |_depth, _dir, _state, children| {
                children.retain(|entry| {
                    let Ok(entry) = entry else {
                        return true;
                    };
                    if !entry.file_type().is_dir() {
                        return true;
                    }
                    let rel = relative_path(&prune_root, &entry.path());
                    if engine.should_prune(&rel) {
                        trace!(dir = %rel, "Pruned");
                        pruned.fetch_add(1, Ordering::Relaxed);
                        false
                    } else {
                        true
                    }
                });
            });
        }

        let mut tracker = ProgressTracker::new();
        let mut outcome = WalkOutcome {
            root: root.clone(),
            ..WalkOutcome::default()
        };

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), "Walk error: {err}");
                    outcome
                        .warnings
                        .push(ScanWarning::new(path, err.to_string(), WarningKind::Unreadable));
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                tracker.record_dir();
                continue;
            }

            let path = entry.path();
            let rel = relative_path(&root, &path);
            let accepted = engine.is_included(&rel);
            tracker.record_file(path.clone(), accepted);

            if !accepted {
                outcome.filtered += 1;
            } else if file_type.is_symlink() {
                debug!(path = %rel, "Skipping symlink");
                outcome.warnings.push(ScanWarning::symlink(&path));
            } else if file_type.is_file() {
                outcome.candidates.push(Candidate {
                    rel_path: rel.into(),
                    path,
                });
            }

            if tracker.files_seen() % PROGRESS_INTERVAL == 0 {
                let _ = self
                    .progress_tx
                    .send(tracker.snapshot(pruned.load(Ordering::Relaxed)));
            }
        }

        outcome.pruned_dirs = pruned.load(Ordering::Relaxed);
        let _ = self.progress_tx.send(tracker.snapshot(outcome.pruned_dirs));

        debug!(
            root = %root.display(),
            files = tracker.files_seen(),
            accepted = tracker.files_accepted(),
            pruned_dirs = outcome.pruned_dirs,
            "Walk complete"
        );

        Ok(outcome)
    }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize `path` to a `/`-separated path relative to `root`.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheaf_filter::{FilterRules, IgnoreFile};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir(root.join("docs")).unwrap();

        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/nested/lib.rs"), "pub fn f() {}").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(root.join("docs/guide.md"), "# guide").unwrap();

        temp
    }

    fn walk(temp: &TempDir, rules: FilterRules, ignore: &str, prune: bool) -> WalkOutcome {
        let mut config = SnapshotConfig::new(temp.path());
        config.prune_dirs = prune;
        let engine = FilterEngine::build(&rules, &IgnoreFile::parse(ignore)).unwrap();
        TreeWalker::new().walk(&config, &engine).unwrap()
    }

    fn rel_paths(outcome: &WalkOutcome) -> Vec<&str> {
        outcome.candidates.iter().map(|c| c.rel_path.as_str()).collect()
    }

    #[test]
    fn test_sorted_depth_first_order() {
        let temp = create_test_tree();
        let outcome = walk(&temp, FilterRules::default(), "", true);

        assert_eq!(
            rel_paths(&outcome),
            vec![
                "a.txt",
                "b.txt",
                "docs/guide.md",
                "src/main.rs",
                "src/nested/lib.rs"
            ]
        );
    }

    #[test]
    fn test_prunes_excluded_directories() {
        let temp = create_test_tree();
        let outcome = walk(&temp, FilterRules::default(), "", true);

        assert_eq!(outcome.pruned_dirs, 1);
        assert!(!rel_paths(&outcome).contains(&"node_modules/pkg/index.js"));
    }

    #[test]
    fn test_without_pruning_files_are_filtered_individually() {
        let temp = create_test_tree();
        let pruned = walk(&temp, FilterRules::default(), "", true);
        let unpruned = walk(&temp, FilterRules::default(), "", false);

        assert_eq!(unpruned.pruned_dirs, 0);
        assert_eq!(unpruned.filtered, 1);
        assert_eq!(rel_paths(&pruned), rel_paths(&unpruned));
    }

    #[test]
    fn test_ignore_file_directory_is_pruned() {
        let temp = create_test_tree();
        let outcome = walk(&temp, FilterRules::default(), "docs/\n", true);

        assert_eq!(outcome.pruned_dirs, 2);
        assert!(!rel_paths(&outcome).contains(&"docs/guide.md"));
    }

    #[test]
    fn test_not_a_directory() {
        let temp = create_test_tree();
        let config = SnapshotConfig::new(temp.path().join("a.txt"));
        let engine = FilterEngine::build(&FilterRules::default(), &IgnoreFile::empty()).unwrap();

        let err = TreeWalker::new().walk(&config, &engine).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let config = SnapshotConfig::new(temp.path().join("missing"));
        let engine = FilterEngine::build(&FilterRules::default(), &IgnoreFile::empty()).unwrap();

        let err = TreeWalker::new().walk(&config, &engine).unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound { .. }));
    }

    #[test]
    fn test_progress_final_update() {
        let temp = create_test_tree();
        let config = SnapshotConfig::new(temp.path());
        let engine = FilterEngine::build(&FilterRules::default(), &IgnoreFile::empty()).unwrap();

        let walker = TreeWalker::new();
        let mut rx = walker.subscribe();
        walker.walk(&config, &engine).unwrap();

        let last = std::iter::from_fn(|| rx.try_recv().ok()).last().unwrap();
        assert_eq!(last.files_accepted, 5);
        assert_eq!(last.dirs_pruned, 1);
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(relative_path(root, &root.join("a").join("b.rs")), "a/b.rs");
    }
}
