//! Export artifacts
//!
//! Writes a query's record set to a JSON file named for the status
//! filter, for downstream consumption. Writes are atomic (temp file +
//! rename), same as the file store, so a consumer never sees a
//! half-written artifact.

use crate::error::{Error, Result};
use crate::traits::{Record, StatusFilter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Result of an export invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Artifact written
    Written {
        /// Where the artifact landed
        path: PathBuf,
        /// How many records it contains
        count: usize,
    },
    /// The filter matched no records; no file was produced
    NothingToExport,
}

/// One exported row
///
/// The `active` flag is omitted when the filter already implies it;
/// the `export_all` artifact always carries it.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub postal_code: String,
    pub address_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExportRecord {
    fn from_record(record: &Record, include_status: bool) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            postal_code: record.postal_code.clone(),
            address_line: record.address_line.clone(),
            active: include_status.then_some(record.active),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Artifact file name for a status filter
pub fn artifact_name(status: StatusFilter) -> &'static str {
    match status {
        StatusFilter::ActiveOnly => "export_active.json",
        StatusFilter::InactiveOnly => "export_inactive.json",
        StatusFilter::All => "export_all.json",
    }
}

/// Write the artifact for `status` into `directory`, returning its path
///
/// The caller decides what an empty record set means; this writer
/// expects a non-empty slice and always produces a file.
pub async fn write_artifact(
    directory: &Path,
    status: StatusFilter,
    records: &[Record],
) -> Result<PathBuf> {
    let include_status = matches!(status, StatusFilter::All);
    let rows: Vec<ExportRecord> = records
        .iter()
        .map(|record| ExportRecord::from_record(record, include_status))
        .collect();
    let json = serde_json::to_string_pretty(&rows)?;

    if !directory.as_os_str().is_empty() && !directory.exists() {
        fs::create_dir_all(directory).await.map_err(|e| {
            Error::export(format!(
                "failed to create export directory {}: {}",
                directory.display(),
                e
            ))
        })?;
    }

    let path = directory.join(artifact_name(status));
    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            Error::export(format!(
                "failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        file.write_all(json.as_bytes()).await.map_err(|e| {
            Error::export(format!(
                "failed to write temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        file.flush().await.map_err(|e| {
            Error::export(format!(
                "failed to flush temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
    }

    fs::rename(&temp_path, &path).await.map_err(|e| {
        Error::export(format!(
            "failed to rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        ))
    })?;

    Ok(path)
}
