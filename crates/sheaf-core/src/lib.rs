//! Core types for sheaf.
//!
//! This crate provides the data structures shared by every stage of a
//! snapshot run: the run configuration, per-file records, the aggregate
//! snapshot and the error and warning types.

mod config;
mod error;
mod record;
mod snapshot;

pub use config::{
    DEFAULT_IGNORE_FILE, DEFAULT_MAX_FILE_SIZE, DEFAULT_PROFILE, DEFAULT_SNIFF_LEN, SnapshotConfig,
    SnapshotConfigBuilder,
};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use record::{CHARS_PER_TOKEN, ContentHash, FileRecord, estimate_tokens};
pub use snapshot::{IgnoreFileInfo, SkipStats, Snapshot, SnapshotMeta, Summary, TOOL_NAME};
