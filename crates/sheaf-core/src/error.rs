//! Root-level failures and per-path warnings.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The root directory could not be walked. Nothing below the root is ever
/// fatal; those problems become [`ScanWarning`]s.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root does not exist.
    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    /// The root exists but cannot be listed.
    #[error("Permission denied on root directory: {path}")]
    RootPermissionDenied { path: PathBuf },

    /// The root is a file or something else that cannot be walked.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Any other I/O failure on the root.
    #[error("Cannot open root directory {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Map an I/O error on the root to the matching variant.
    pub fn root(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::RootNotFound { path },
            io::ErrorKind::PermissionDenied => Self::RootPermissionDenied { path },
            _ => Self::Root { path, source },
        }
    }

    /// The root path involved.
    pub fn path(&self) -> &Path {
        match self {
            Self::RootNotFound { path }
            | Self::RootPermissionDenied { path }
            | Self::NotADirectory { path }
            | Self::Root { path, .. } => path,
        }
    }
}

/// Why a path was skipped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The OS refused access.
    PermissionDenied,
    /// Open, read or directory listing failed.
    Unreadable,
    /// Symbolic link left alone because links are not followed.
    Symlink,
    /// The ignore file exists but could not be read; it counts as empty.
    IgnoreFile,
}

impl WarningKind {
    /// Short label used in log lines and the summary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission denied",
            Self::Unreadable => "unreadable",
            Self::Symlink => "symlink",
            Self::IgnoreFile => "ignore file",
        }
    }
}

/// A path that was skipped while the run carried on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path that was skipped.
    pub path: PathBuf,
    /// Underlying error text.
    pub message: String,
    /// Category of the failure.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Warning for a failed read. Permission failures keep their own kind.
    pub fn from_io(path: impl Into<PathBuf>, error: &io::Error) -> Self {
        let kind = if error.kind() == io::ErrorKind::PermissionDenied {
            WarningKind::PermissionDenied
        } else {
            WarningKind::Unreadable
        };
        Self::new(path, error.to_string(), kind)
    }

    /// Warning for a symlink that was not followed.
    pub fn symlink(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "not followed", WarningKind::Symlink)
    }

    /// Warning for an ignore file that exists but could not be read.
    pub fn ignore_file(path: impl Into<PathBuf>, error: &io::Error) -> Self {
        Self::new(path, error.to_string(), WarningKind::IgnoreFile)
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_error_mapping() {
        let err = ScanError::root("/repo", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ScanError::RootNotFound { .. }));

        let err = ScanError::root("/repo", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ScanError::RootPermissionDenied { .. }));

        let err = ScanError::root("/repo", io::Error::other("disk on fire"));
        assert!(matches!(err, ScanError::Root { .. }));
        assert_eq!(err.path(), Path::new("/repo"));
    }

    #[test]
    fn test_warning_from_io() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(
            ScanWarning::from_io("a.txt", &denied).kind,
            WarningKind::PermissionDenied
        );

        let other = io::Error::other("boom");
        let warning = ScanWarning::from_io("a.txt", &other);
        assert_eq!(warning.kind, WarningKind::Unreadable);
        assert_eq!(warning.to_string(), "a.txt: boom (unreadable)");
    }
}
