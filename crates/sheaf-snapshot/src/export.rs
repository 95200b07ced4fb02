//! JSON and JSON Lines export.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::info;

use sheaf_core::{FileRecord, Snapshot, SnapshotMeta};

use crate::error::SnapshotError;

/// Output serialization.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// One pretty-printed `{meta, files}` document.
    #[default]
    Json,
    /// A meta line followed by one line per file.
    Jsonl,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        self.into()
    }

    /// Default output file name.
    pub fn default_file_name(self) -> String {
        format!("repo_snapshot.{}", self.extension())
    }
}

/// One JSON Lines record.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Line<'a> {
    Meta(&'a SnapshotMeta),
    File(&'a FileRecord),
}

/// Serialize `snapshot` to `writer`.
///
/// Non-ASCII text is written as UTF-8, not escaped.
pub fn write_snapshot<W: Write>(
    snapshot: &Snapshot,
    format: OutputFormat,
    mut writer: W,
) -> Result<(), SnapshotError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            serde_json::to_writer(&mut writer, &Line::Meta(&snapshot.meta))?;
            writeln!(writer)?;
            for file in &snapshot.files {
                serde_json::to_writer(&mut writer, &Line::File(file))?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write `snapshot` to `path`, creating parent directories as needed.
///
/// Returns the number of bytes written.
pub fn export_to_path(
    snapshot: &Snapshot,
    format: OutputFormat,
    path: &Path,
) -> Result<u64, SnapshotError> {
    let mut buf = Vec::new();
    write_snapshot(snapshot, format, &mut buf)?;

    let export_err = |source| SnapshotError::Export {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(export_err)?;
    }
    fs::write(path, &buf).map_err(export_err)?;

    info!(path = %path.display(), %format, bytes = buf.len(), "Wrote snapshot");
    Ok(buf.len() as u64)
}
