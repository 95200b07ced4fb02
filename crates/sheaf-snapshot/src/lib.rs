//! Snapshot assembly and export for sheaf.
//!
//! This crate ties the filter and the walker together into one run:
//!
//! 1. Load the ignore file and compile every pattern (fatal on error)
//! 2. Walk the root in sorted order, pruning vetoed directories
//! 3. Classify each surviving file as text, binary or too large
//! 4. Read text files, hash their bytes with BLAKE3 and build records
//!
//! ```rust,no_run
//! use sheaf_snapshot::{OutputFormat, SnapshotConfig, Snapshotter, export_to_path};
//!
//! let config = SnapshotConfig::builder()
//!     .root("/path/to/repo")
//!     .includes(vec!["^src/".to_string()])
//!     .build()
//!     .unwrap();
//!
//! let snapshot = Snapshotter::new(config).run().unwrap();
//! println!("{} files, ~{} tokens", snapshot.total_files(), snapshot.meta.summary.estimated_tokens);
//!
//! export_to_path(&snapshot, OutputFormat::Jsonl, "repo_snapshot.jsonl".as_ref()).unwrap();
//! ```

mod assembler;
mod error;
mod export;
mod parallel;
mod pipeline;

pub use assembler::{ReadOutcome, SnapshotAssembler, hash_bytes};
pub use error::SnapshotError;
pub use export::{OutputFormat, export_to_path, write_snapshot};
pub use pipeline::{Selection, Snapshotter};

// Re-export core types
pub use sheaf_core::{FileRecord, Snapshot, SnapshotConfig, SnapshotMeta, Summary};
