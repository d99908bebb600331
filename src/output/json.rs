//! JSON export of crawled records
//!
//! Records are wrapped with export metadata and written pretty-printed with
//! two-space indentation. Non-ASCII characters are kept as-is.

use crate::output::{OutputError, OutputResult};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportMeta {
    /// UTC export time, ISO-8601 with a `Z` suffix
    pub exported_at: String,

    /// Always equal to the number of exported records
    pub record_count: usize,
}

/// The document written to disk
#[derive(Debug, Serialize)]
pub struct ExportPayload<'a, T> {
    pub meta: ExportMeta,
    pub data: &'a [T],
}

impl<'a, T: Serialize> ExportPayload<'a, T> {
    /// Wraps records with metadata stamped now
    pub fn new(records: &'a [T]) -> Self {
        Self {
            meta: ExportMeta {
                exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
                record_count: records.len(),
            },
            data: records,
        }
    }
}

/// Exports records to a JSON file
///
/// Missing parent directories are created first.
///
/// # Arguments
///
/// * `records` - The records to export, in crawl order
/// * `path` - Destination file
///
/// # Returns
///
/// * `Ok(ExportMeta)` - Metadata of the written file
/// * `Err(OutputError)` - Failed to create directories, serialize or write
pub fn export_to_json<T: Serialize>(records: &[T], path: &Path) -> OutputResult<ExportMeta> {
    ensure_parent_dir(path)?;

    let payload = ExportPayload::new(records);

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &payload)
        .map_err(|e| OutputError::Format(e.to_string()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Exported {} records to {}", payload.meta.record_count, path.display());

    Ok(payload.meta)
}

fn ensure_parent_dir(path: &Path) -> OutputResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            tracing::info!("Creating directory {}", parent.display());
            fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}
