//! End-to-end snapshot runs.

use std::path::PathBuf;

use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use sheaf_core::{IgnoreFileInfo, ScanWarning, SkipStats, Snapshot, SnapshotConfig};
use sheaf_filter::{FilterEngine, FilterError, IgnoreFile};
use sheaf_scan::{Candidate, Classification, ContentClassifier, ScanProgress, TreeWalker};

use crate::assembler::SnapshotAssembler;
use crate::error::SnapshotError;
use crate::parallel::map_ordered;

/// Text files chosen for a snapshot, before their content is read.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Canonical root that was walked.
    pub root: PathBuf,
    /// Active profile name.
    pub profile: String,
    /// Ignore file status.
    pub ignore_file: IgnoreFileInfo,
    /// Text files in traversal order.
    pub text: Vec<Candidate>,
    /// Skip counts so far.
    pub skipped: SkipStats,
    /// Per-path warnings so far.
    pub warnings: Vec<ScanWarning>,
}

impl Selection {
    /// Iterate over the selected relative paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.text.iter().map(|c| c.rel_path.as_str())
    }
}

/// Runs the whole pipeline for one configuration.
pub struct Snapshotter {
    config: SnapshotConfig,
    walker: TreeWalker,
}

impl Snapshotter {
    /// Create a snapshotter for `config`.
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            config,
            walker: TreeWalker::new(),
        }
    }

    /// The run configuration.
    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Subscribe to walk progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.walker.subscribe()
    }

    /// Load the ignore file from the root.
    ///
    /// A file that exists but cannot be read is logged and treated as
    /// present with no directives.
    pub fn load_ignore_file(&self) -> (IgnoreFile, Option<ScanWarning>) {
        match IgnoreFile::load(&self.config.root, &self.config.ignore_file_name) {
            Ok(ignore) => (ignore, None),
            Err(FilterError::IgnoreFile { path, source }) => {
                warn!(path = %path.display(), "Ignoring unreadable ignore file: {source}");
                let warning = ScanWarning::ignore_file(&path, &source);
                (IgnoreFile::unreadable(path), Some(warning))
            }
            Err(err) => {
                warn!("Ignoring ignore file: {err}");
                (IgnoreFile::empty(), None)
            }
        }
    }

    /// Walk, filter and classify, without reading any content beyond the
    /// sniffed prefix.
    pub fn select(&self) -> Result<Selection, SnapshotError> {
        let (ignore, ignore_warning) = self.load_ignore_file();
        let engine = FilterEngine::from_config(&self.config, &ignore)?;

        info!(
            root = %self.config.root.display(),
            profile = %engine.profile(),
            "Starting snapshot"
        );

        let outcome = self.walker.walk(&self.config, &engine)?;

        let mut skipped = SkipStats {
            filtered: outcome.filtered,
            pruned_dirs: outcome.pruned_dirs,
            ..SkipStats::default()
        };
        let mut warnings: Vec<ScanWarning> = ignore_warning.into_iter().collect();
        warnings.extend(outcome.warnings);

        let classifier = ContentClassifier::from_config(&self.config);
        let classified = map_ordered(&outcome.candidates, self.config.threads, |candidate| {
            classifier.classify(&candidate.path)
        });

        let mut text = Vec::with_capacity(outcome.candidates.len());
        for (candidate, result) in outcome.candidates.into_iter().zip(classified) {
            match result {
                Ok(Classification::Text) => text.push(candidate),
                Ok(Classification::Binary) => {
                    trace!(path = %candidate.rel_path, "Skipping binary file");
                    skipped.binary += 1;
                }
                Ok(Classification::TooLarge) => {
                    trace!(path = %candidate.rel_path, "Skipping large file");
                    skipped.too_large += 1;
                }
                Err(err) => {
                    warn!(path = %candidate.rel_path, "Failed to classify: {err}");
                    skipped.unreadable += 1;
                    warnings.push(ScanWarning::from_io(&candidate.path, &err));
                }
            }
        }

        debug!(
            text = text.len(),
            binary = skipped.binary,
            too_large = skipped.too_large,
            unreadable = skipped.unreadable,
            "Classified candidates"
        );

        Ok(Selection {
            root: outcome.root,
            profile: engine.profile().to_string(),
            ignore_file: ignore.info(&self.config.ignore_file_name),
            text,
            skipped,
            warnings,
        })
    }

    /// Produce the snapshot.
    pub fn run(&self) -> Result<Snapshot, SnapshotError> {
        let selection = self.select()?;
        let snapshot = SnapshotAssembler::from_config(&self.config).assemble(selection);

        info!(
            files = snapshot.total_files(),
            chars = snapshot.meta.summary.total_chars,
            tokens = snapshot.meta.summary.estimated_tokens,
            "Snapshot complete"
        );

        Ok(snapshot)
    }
}
