//! Filter configuration errors. All of them are fatal for a run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The requested profile does not exist.
    #[error("Unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    /// The ignore file exists but could not be read.
    #[error("Cannot read ignore file {path}: {source}")]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FilterError {
    /// The offending pattern string, if this is a pattern error.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::InvalidPattern { pattern, .. } => Some(pattern),
            _ => None,
        }
    }
}
