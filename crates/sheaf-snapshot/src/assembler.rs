//! Reads classified text files into snapshot records.

use std::fs::File;
use std::io::{self, Read};

use tracing::{debug, trace, warn};

use sheaf_core::{ContentHash, FileRecord, ScanWarning, Snapshot, SnapshotConfig};
use sheaf_scan::{Candidate, Classification, ContentClassifier};

use crate::parallel::map_ordered;
use crate::pipeline::Selection;

/// Hash raw file bytes with BLAKE3.
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    ContentHash::new(*blake3::hash(bytes).as_bytes())
}

/// What reading one selected file produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The file became a record.
    Record(FileRecord),
    /// Whitespace only, with blank skipping enabled.
    Blank,
    /// A NUL byte appeared since classification.
    Binary,
    /// The file grew past the size cap since classification.
    TooLarge,
}

/// Builds the final [`Snapshot`] from a selection of text files.
///
/// Files are read in parallel but records keep the selection order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotAssembler {
    classifier: ContentClassifier,
    skip_blank: bool,
    threads: usize,
}

impl SnapshotAssembler {
    /// Create an assembler with the default size cap and sniff length.
    pub fn new(skip_blank: bool, threads: usize) -> Self {
        Self {
            classifier: ContentClassifier::default(),
            skip_blank,
            threads,
        }
    }

    /// Create an assembler with the configured limits.
    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(config.skip_blank, config.threads)
            .with_classifier(ContentClassifier::from_config(config))
    }

    /// Use `classifier` to re-check content as it is read.
    pub fn with_classifier(mut self, classifier: ContentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Read a single file.
    ///
    /// At most one byte past the size cap is read. The bytes actually read
    /// are classified again, so a file that changed since selection is
    /// still held to the cap and the binary check. Content is decoded as
    /// UTF-8 with invalid sequences replaced; the hash covers the original
    /// bytes.
    pub fn read_record(&self, candidate: &Candidate) -> io::Result<ReadOutcome> {
        let limit = self.classifier.max_size().saturating_add(1);
        let mut bytes = Vec::new();
        File::open(&candidate.path)?
            .take(limit)
            .read_to_end(&mut bytes)?;

        match self.classifier.classify_content(&candidate.path, &bytes) {
            Classification::Text => {}
            Classification::Binary => return Ok(ReadOutcome::Binary),
            Classification::TooLarge => return Ok(ReadOutcome::TooLarge),
        }

        let hash = hash_bytes(&bytes);
        let content = String::from_utf8_lossy(&bytes).into_owned();

        if self.skip_blank && content.trim().is_empty() {
            return Ok(ReadOutcome::Blank);
        }

        Ok(ReadOutcome::Record(FileRecord::new(
            candidate.rel_path.clone(),
            content,
            hash,
        )))
    }

    /// Read every selected file and build the snapshot.
    ///
    /// A file that disappeared or became unreadable since classification is
    /// counted as unreadable and recorded as a warning.
    pub fn assemble(&self, selection: Selection) -> Snapshot {
        let Selection {
            root,
            profile,
            ignore_file,
            text,
            mut skipped,
            mut warnings,
        } = selection;

        let outcomes = map_ordered(&text, self.threads, |candidate| {
            self.read_record(candidate)
        });

        let mut files = Vec::with_capacity(outcomes.len());
        for (candidate, outcome) in text.iter().zip(outcomes) {
            match outcome {
                Ok(ReadOutcome::Record(record)) => files.push(record),
                Ok(ReadOutcome::Blank) => {
                    trace!(path = %candidate.rel_path, "Skipping blank file");
                    skipped.blank += 1;
                }
                Ok(ReadOutcome::Binary) => {
                    trace!(path = %candidate.rel_path, "Skipping file that turned binary");
                    skipped.binary += 1;
                }
                Ok(ReadOutcome::TooLarge) => {
                    trace!(path = %candidate.rel_path, "Skipping file that outgrew the cap");
                    skipped.too_large += 1;
                }
                Err(err) => {
                    warn!(path = %candidate.rel_path, "Failed to read: {err}");
                    skipped.unreadable += 1;
                    warnings.push(ScanWarning::from_io(&candidate.path, &err));
                }
            }
        }

        debug!(
            files = files.len(),
            blank = skipped.blank,
            unreadable = skipped.unreadable,
            "Assembled snapshot"
        );

        Snapshot::new(root, profile, ignore_file, files, skipped, warnings)
    }
}
