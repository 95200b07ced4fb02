//! Directory walking and content classification for sheaf.
//!
//! # Overview
//!
//! `sheaf-scan` enumerates the files under a root and decides which of
//! them are readable text:
//!
//! - **Sorted traversal** via jwalk, so output order never depends on the
//!   host filesystem
//! - **Early pruning** of directories the filter vetoes
//! - **Binary sniffing** and a size cap per file
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use sheaf_filter::{FilterEngine, IgnoreFile};
//! use sheaf_scan::{ContentClassifier, SnapshotConfig, TreeWalker};
//!
//! let config = SnapshotConfig::new("/path/to/repo");
//! let ignore = IgnoreFile::load(&config.root, &config.ignore_file_name).unwrap();
//! let engine = FilterEngine::from_config(&config, &ignore).unwrap();
//!
//! let outcome = TreeWalker::new().walk(&config, &engine).unwrap();
//! let classifier = ContentClassifier::from_config(&config);
//! for candidate in &outcome.candidates {
//!     println!("{}: {:?}", candidate.rel_path, classifier.classify(&candidate.path));
//! }
//! ```

mod classify;
mod progress;
mod walker;

pub use classify::{Classification, ContentClassifier, TEXT_EXTENSIONS};
pub use progress::ScanProgress;
pub use walker::{Candidate, TreeWalker, WalkOutcome, relative_path};

// Re-export core types for convenience
pub use sheaf_core::{ScanError, ScanWarning, SnapshotConfig, WarningKind};
