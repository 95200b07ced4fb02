//! Text/binary classification with a size cap.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use strum::{Display, IntoStaticStr};

use sheaf_core::{DEFAULT_MAX_FILE_SIZE, DEFAULT_SNIFF_LEN, SnapshotConfig};

/// Extensions an empty file may carry and still count as text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "py", "md", "rst", "txt", "json", "yaml", "yml", "toml", "ini", "cfg", "xml", "csv", "tsv",
    "html", "css", "js", "ts", "tsx", "c", "h", "cpp", "hpp", "java", "kt", "go", "rs", "rb",
    "php", "sh", "ps1",
];

/// How a file's content was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Classification {
    /// Readable text within the size cap.
    Text,
    /// A NUL byte appears in the sniffed prefix, or the file is empty
    /// and its extension is not a known text one.
    Binary,
    /// Larger than the size cap.
    TooLarge,
}

impl Classification {
    /// Check if the file should be read into the snapshot.
    pub fn is_text(self) -> bool {
        matches!(self, Classification::Text)
    }
}

/// Decides whether a file is text, reading at most a short prefix.
#[derive(Debug, Clone, Copy)]
pub struct ContentClassifier {
    max_size: u64,
    sniff_len: usize,
}

impl ContentClassifier {
    /// Create a classifier. A file of exactly `max_size` bytes is text.
    pub fn new(max_size: u64, sniff_len: usize) -> Self {
        Self {
            max_size,
            sniff_len,
        }
    }

    /// Create a classifier with the configured limits.
    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(config.max_file_size, config.sniff_len)
    }

    /// The size cap in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Classify a file on disk.
    ///
    /// The size cap is checked from metadata before anything is read. An
    /// error means the file could not be opened or read; callers treat it
    /// as a skipped file.
    pub fn classify(&self, path: &Path) -> io::Result<Classification> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        if size > self.max_size {
            return Ok(Classification::TooLarge);
        }
        if size == 0 {
            return Ok(classify_empty(path));
        }

        let prefix_len = (self.sniff_len as u64).min(size);
        let mut prefix = Vec::with_capacity(prefix_len as usize);
        file.take(self.sniff_len as u64).read_to_end(&mut prefix)?;

        Ok(self.sniff(&prefix))
    }

    /// Classify content already in memory.
    pub fn classify_bytes(&self, bytes: &[u8]) -> Classification {
        if bytes.len() as u64 > self.max_size {
            return Classification::TooLarge;
        }
        let end = bytes.len().min(self.sniff_len);
        self.sniff(&bytes[..end])
    }

    /// Classify content read from `path`, applying the empty-file rule.
    pub fn classify_content(&self, path: &Path, bytes: &[u8]) -> Classification {
        if bytes.is_empty() {
            classify_empty(path)
        } else {
            self.classify_bytes(bytes)
        }
    }

    fn sniff(&self, prefix: &[u8]) -> Classification {
        if prefix.contains(&0) {
            Classification::Binary
        } else {
            Classification::Text
        }
    }
}

/// An empty file is text when it has no extension or a known text one.
fn classify_empty(path: &Path) -> Classification {
    let is_text = match path.extension() {
        None => true,
        Some(ext) => {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            TEXT_EXTENSIONS.contains(&ext.as_str())
        }
    };
    if is_text {
        Classification::Text
    } else {
        Classification::Binary
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE, DEFAULT_SNIFF_LEN)
    }
}
