//! Snapshot container and summary statistics.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;
use crate::record::FileRecord;

/// Tool name embedded in snapshot metadata.
pub const TOOL_NAME: &str = "sheaf";

/// Ignore file status for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreFileInfo {
    /// File name looked up in the root.
    pub file: String,
    /// Whether the file exists.
    pub present: bool,
    /// Number of exclusion directives.
    pub patterns: usize,
    /// Number of negation directives.
    pub negations: usize,
}

/// Totals over the record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of records.
    pub total_files: u64,
    /// Sum of character counts.
    pub total_chars: u64,
    /// Sum of token estimates.
    pub estimated_tokens: u64,
}

impl Summary {
    /// Sum the record list.
    pub fn from_records(records: &[FileRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            acc.total_files += 1;
            acc.total_chars += r.size_chars;
            acc.estimated_tokens += r.estimated_tokens;
            acc
        })
    }
}

/// Counts of paths dropped as routine filtering outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipStats {
    /// Files rejected by the filter engine.
    pub filtered: u64,
    /// Directories not descended into.
    pub pruned_dirs: u64,
    /// Files with a NUL byte in the sniffed prefix.
    pub binary: u64,
    /// Files over the size cap.
    pub too_large: u64,
    /// Files that could not be opened or read.
    pub unreadable: u64,
    /// Whitespace-only files, when blank skipping is enabled.
    pub blank: u64,
}

impl SkipStats {
    /// Total number of skipped files (directories not counted).
    pub fn total_files(&self) -> u64 {
        self.filtered + self.binary + self.too_large + self.unreadable + self.blank
    }
}

/// Snapshot metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Producing tool.
    pub tool: String,
    /// Producing tool version.
    pub version: String,
    /// License the tool is distributed under.
    #[serde(default)]
    pub license: String,
    /// Where the tool's source lives.
    #[serde(default)]
    pub repository: String,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Root that was scanned.
    pub root_directory: PathBuf,
    /// Active profile name.
    pub profile: String,
    /// Ignore file status.
    pub ignore_file: IgnoreFileInfo,
    /// Totals over the record list.
    pub summary: Summary,
    /// Routine skip counts.
    pub skipped: SkipStats,
}

/// Complete result of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Run metadata.
    pub meta: SnapshotMeta,

    /// Records in traversal order.
    pub files: Vec<FileRecord>,

    /// Per-path warnings. Not part of the serialized snapshot.
    #[serde(skip)]
    pub warnings: Vec<ScanWarning>,
}

impl Snapshot {
    /// Build a snapshot, computing the summary from `files`.
    pub fn new(
        root_directory: PathBuf,
        profile: impl Into<String>,
        ignore_file: IgnoreFileInfo,
        files: Vec<FileRecord>,
        skipped: SkipStats,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        let summary = Summary::from_records(&files);
        Self {
            meta: SnapshotMeta {
                tool: TOOL_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                license: env!("CARGO_PKG_LICENSE").to_string(),
                repository: env!("CARGO_PKG_REPOSITORY").to_string(),
                timestamp: Utc::now(),
                root_directory,
                profile: profile.into(),
                ignore_file,
                summary,
                skipped,
            },
            files,
            warnings,
        }
    }

    /// Check if no file survived filtering.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Get the total number of files.
    pub fn total_files(&self) -> u64 {
        self.meta.summary.total_files
    }

    /// Iterate over the relative paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ContentHash;

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord::new(path, content.to_string(), ContentHash::new([0; 32]))
    }

    #[test]
    fn test_summary_sums_records() {
        let files = vec![record("a.py", "print('hi')"), record("b.md", "# b")];
        let summary = Summary::from_records(&files);

        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.total_chars, 14);
        assert_eq!(summary.estimated_tokens, 2 + 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::new(
            PathBuf::from("/repo"),
            "minimal",
            IgnoreFileInfo::default(),
            Vec::new(),
            SkipStats::default(),
            Vec::new(),
        );
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_files(), 0);
        assert_eq!(snapshot.meta.tool, TOOL_NAME);
    }

    #[test]
    fn test_meta_carries_package_info() {
        let snapshot = Snapshot::new(
            PathBuf::from("/repo"),
            "minimal",
            IgnoreFileInfo::default(),
            Vec::new(),
            SkipStats::default(),
            Vec::new(),
        );
        assert_eq!(snapshot.meta.license, "MIT OR Apache-2.0");
        assert!(snapshot.meta.repository.starts_with("https://"));

        let value = serde_json::to_value(&snapshot.meta).unwrap();
        assert_eq!(value["license"], "MIT OR Apache-2.0");
        assert_eq!(value["repository"], snapshot.meta.repository.as_str());
    }

    #[test]
    fn test_skip_stats_total() {
        let stats = SkipStats {
            filtered: 3,
            pruned_dirs: 9,
            binary: 1,
            too_large: 1,
            unreadable: 0,
            blank: 2,
        };
        assert_eq!(stats.total_files(), 7);
    }
}
