//! Errors for a snapshot run.

use std::path::PathBuf;

use sheaf_core::ScanError;
use sheaf_filter::FilterError;
use thiserror::Error;

/// Fatal errors. Per-file problems never surface here; they are counted
/// and recorded as warnings on the snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Invalid pattern, unknown profile or unreadable ignore file.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The root could not be walked.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Serialization failed.
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing to the output stream failed.
    #[error("Failed to write snapshot: {0}")]
    Write(#[from] std::io::Error),

    /// Writing the output file failed.
    #[error("Failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
