//! Per-file snapshot records.

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Characters per estimated token.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Estimate the language-model token count for a text of `chars` characters.
///
/// Empty text is zero tokens; any non-empty text is at least one.
pub fn estimate_tokens(chars: u64) -> u64 {
    if chars == 0 {
        0
    } else {
        (chars / CHARS_PER_TOKEN).max(1)
    }
}

/// BLAKE3 hash of a file's raw bytes. Serialized as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 || !s.is_ascii() {
            return Err(format!("expected 64 hex digits, got {s:?}"));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|e| format!("invalid hex in {s:?}: {e}"))?;
        }
        Ok(Self(bytes))
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.to_hex()
    }
}

impl TryFrom<String> for ContentHash {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One included file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Root-relative path with `/` separators.
    pub path: CompactString,

    /// File content decoded as UTF-8, invalid sequences replaced.
    pub content: String,

    /// Number of characters in `content`.
    pub size_chars: u64,

    /// Hash of the raw bytes on disk.
    pub hash: ContentHash,

    /// Token estimate derived from `size_chars`.
    pub estimated_tokens: u64,
}

impl FileRecord {
    /// Create a record, deriving the character count and token estimate
    /// from `content`.
    pub fn new(path: impl Into<CompactString>, content: String, hash: ContentHash) -> Self {
        let size_chars = content.chars().count() as u64;
        Self {
            path: path.into(),
            content,
            size_chars,
            hash,
            estimated_tokens: estimate_tokens(size_chars),
        }
    }
}
