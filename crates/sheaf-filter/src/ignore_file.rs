//! Ignore file parsing.

use std::path::{Path, PathBuf};

use itertools::{Either, Itertools};
use sheaf_core::IgnoreFileInfo;

use crate::error::FilterError;

/// One directive from an ignore file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreDirective {
    /// Glob body, without the `!` prefix.
    pub pattern: String,
    /// Whether the line began with `!`.
    pub negated: bool,
    /// 1-based line number.
    pub line: usize,
}

impl IgnoreDirective {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(raw: &str, line: usize) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            return None;
        }

        let (pattern, negated) = match text.strip_prefix('!') {
            Some(rest) => (rest.trim(), true),
            None => (text, false),
        };
        if pattern.is_empty() {
            return None;
        }

        Some(Self {
            pattern: pattern.to_string(),
            negated,
            line,
        })
    }
}

/// Ordered directives read from an ignore file.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFile {
    path: Option<PathBuf>,
    present: bool,
    directives: Vec<IgnoreDirective>,
}

impl IgnoreFile {
    /// An absent ignore file.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse ignore file contents.
    pub fn parse(contents: &str) -> Self {
        let directives = contents
            .lines()
            .enumerate()
            .filter_map(|(i, line)| IgnoreDirective::parse_line(line, i + 1))
            .collect();
        Self {
            path: None,
            present: true,
            directives,
        }
    }

    /// Load `name` from `root`. A missing file is not an error and yields
    /// an empty directive list.
    pub fn load(root: &Path, name: &str) -> Result<Self, FilterError> {
        let path = root.join(name);
        if !path.is_file() {
            return Ok(Self {
                path: Some(path),
                ..Self::default()
            });
        }

        let bytes = std::fs::read(&path).map_err(|source| FilterError::IgnoreFile {
            path: path.clone(),
            source,
        })?;
        let mut file = Self::parse(&String::from_utf8_lossy(&bytes));
        file.path = Some(path);
        Ok(file)
    }

    /// Mark a file that exists but could not be read.
    pub fn unreadable(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            present: true,
            directives: Vec::new(),
        }
    }

    /// Where the file was looked up, if loaded from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the file exists.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// All directives in file order.
    pub fn directives(&self) -> &[IgnoreDirective] {
        &self.directives
    }

    /// Split into (exclusions, negations), each in file order.
    pub fn split(&self) -> (Vec<&IgnoreDirective>, Vec<&IgnoreDirective>) {
        self.directives.iter().partition_map(|d| {
            if d.negated {
                Either::Right(d)
            } else {
                Either::Left(d)
            }
        })
    }

    /// Status summary for snapshot metadata.
    pub fn info(&self, file_name: &str) -> IgnoreFileInfo {
        let negations = self.directives.iter().filter(|d| d.negated).count();
        IgnoreFileInfo {
            file: file_name.to_string(),
            present: self.present,
            patterns: self.directives.len() - negations,
            negations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let file = IgnoreFile::parse("# Ignore logs\n*.log\n\n   \n!important.log\ndist/\n");
        let directives = file.directives();

        assert_eq!(directives.len(), 3);
        assert_eq!(directives[0].pattern, "*.log");
        assert_eq!(directives[0].line, 2);
        assert!(directives[1].negated);
        assert_eq!(directives[1].pattern, "important.log");
        assert_eq!(directives[2].pattern, "dist/");
    }

    #[test]
    fn test_negation_body_is_trimmed() {
        let d = IgnoreDirective::parse_line("!  keep.txt  ", 1).unwrap();
        assert!(d.negated);
        assert_eq!(d.pattern, "keep.txt");
        assert!(IgnoreDirective::parse_line("!", 1).is_none());
    }

    #[test]
    fn test_escaped_prefixes_are_literal() {
        let hash = IgnoreDirective::parse_line(r"\#notes", 1).unwrap();
        assert!(!hash.negated);
        assert_eq!(hash.pattern, r"\#notes");

        let bang = IgnoreDirective::parse_line(r"\!important", 1).unwrap();
        assert!(!bang.negated);
    }

    #[test]
    fn test_crlf_lines() {
        let file = IgnoreFile::parse("*.log\r\n!b.log\r\n");
        assert_eq!(file.directives().len(), 2);
        assert_eq!(file.directives()[1].pattern, "b.log");
    }

    #[test]
    fn test_split_and_info() {
        let file = IgnoreFile::parse("*.log\n!b.log\nbuild/\n");
        let (excludes, negations) = file.split();
        assert_eq!(excludes.len(), 2);
        assert_eq!(negations.len(), 1);

        let info = file.info(".sheafignore");
        assert!(info.present);
        assert_eq!(info.patterns, 2);
        assert_eq!(info.negations, 1);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let file = IgnoreFile::load(temp.path(), ".sheafignore").unwrap();

        assert!(!file.is_present());
        assert!(file.directives().is_empty());
    }

    #[test]
    fn test_load_reads_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".sheafignore"), "*.tmp\n!keep.tmp\n").unwrap();

        let file = IgnoreFile::load(temp.path(), ".sheafignore").unwrap();
        assert!(file.is_present());
        assert_eq!(file.directives().len(), 2);
        assert_eq!(
            file.path(),
            Some(temp.path().join(".sheafignore").as_path())
        );
    }
}
