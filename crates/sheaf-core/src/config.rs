//! Snapshot run configuration.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Name of the per-root ignore file.
pub const DEFAULT_IGNORE_FILE: &str = ".sheafignore";

/// Profile used when none is selected.
pub const DEFAULT_PROFILE: &str = "minimal";

/// Files larger than this are skipped (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Number of leading bytes inspected for a NUL byte.
pub const DEFAULT_SNIFF_LEN: usize = 1024;

/// Configuration for a snapshot run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SnapshotConfig {
    /// Root directory to snapshot.
    pub root: PathBuf,

    /// Name of the active profile.
    #[builder(default = "DEFAULT_PROFILE.to_string()")]
    #[serde(default = "default_profile")]
    pub profile: String,

    /// User include regexes. When non-empty they replace the profile's
    /// include set.
    #[builder(default)]
    #[serde(default)]
    pub includes: Vec<String>,

    /// User exclude regexes.
    #[builder(default)]
    #[serde(default)]
    pub excludes: Vec<String>,

    /// File name of the ignore file looked up in the root.
    #[builder(default = "DEFAULT_IGNORE_FILE.to_string()")]
    #[serde(default = "default_ignore_file")]
    pub ignore_file_name: String,

    /// Size cap in bytes; a file of exactly this size is still included.
    #[builder(default = "DEFAULT_MAX_FILE_SIZE")]
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Prefix length sniffed for binary content.
    #[builder(default = "DEFAULT_SNIFF_LEN")]
    #[serde(default = "default_sniff_len")]
    pub sniff_len: usize,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Skip descending into directories the filter vetoes.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub prune_dirs: bool,

    /// Drop files whose content is only whitespace.
    #[builder(default = "false")]
    #[serde(default)]
    pub skip_blank: bool,

    /// Number of threads for reading and hashing (0 = auto-detect, 1 = serial).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_true() -> bool {
    true
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_ignore_file() -> String {
    DEFAULT_IGNORE_FILE.to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_sniff_len() -> usize {
    DEFAULT_SNIFF_LEN
}

impl SnapshotConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            None => return Err("Root path is required".to_string()),
            _ => {}
        }
        if self.sniff_len == Some(0) {
            return Err("Sniff length must be greater than zero".to_string());
        }
        if let Some(ref name) = self.ignore_file_name {
            if name.is_empty() || name.contains('/') {
                return Err(format!("Invalid ignore file name: {name:?}"));
            }
        }
        Ok(())
    }
}

impl SnapshotConfig {
    /// Create a new config builder.
    pub fn builder() -> SnapshotConfigBuilder {
        SnapshotConfigBuilder::default()
    }

    /// Create a config for a root with every other field at its default.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            profile: default_profile(),
            includes: Vec::new(),
            excludes: Vec::new(),
            ignore_file_name: default_ignore_file(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            sniff_len: DEFAULT_SNIFF_LEN,
            follow_symlinks: false,
            max_depth: None,
            prune_dirs: true,
            skip_blank: false,
            threads: 0,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SnapshotConfig::builder()
            .root("/repo")
            .profile("ai_optimized")
            .excludes(vec![r"\.lock$".to_string()])
            .threads(4usize)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/repo"));
        assert_eq!(config.profile, "ai_optimized");
        assert_eq!(config.excludes.len(), 1);
        assert_eq!(config.threads, 4);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(config.prune_dirs);
    }

    #[test]
    fn test_builder_defaults_match_new() {
        let built = SnapshotConfig::builder().root("/repo").build().unwrap();
        let simple = SnapshotConfig::new("/repo");

        assert_eq!(built.profile, simple.profile);
        assert_eq!(built.ignore_file_name, simple.ignore_file_name);
        assert_eq!(built.sniff_len, simple.sniff_len);
        assert_eq!(built.prune_dirs, simple.prune_dirs);
        assert_eq!(built.skip_blank, simple.skip_blank);
    }

    #[test]
    fn test_builder_rejects_missing_root() {
        assert!(SnapshotConfig::builder().build().is_err());
        assert!(SnapshotConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_builder_rejects_zero_sniff_len() {
        let result = SnapshotConfig::builder()
            .root("/repo")
            .sniff_len(0usize)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_nested_ignore_file_name() {
        let result = SnapshotConfig::builder()
            .root("/repo")
            .ignore_file_name("conf/.sheafignore")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: SnapshotConfig = serde_json::from_str(r#"{"root": "/repo"}"#).unwrap();
        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert_eq!(config.ignore_file_name, DEFAULT_IGNORE_FILE);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(config.prune_dirs);
    }
}
