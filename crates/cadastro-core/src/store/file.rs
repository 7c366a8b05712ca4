// # File Record Store
//
// File-based implementation of RecordStore with crash recovery.
//
// ## Purpose
//
// Provides durable record storage across console sessions. A relational
// engine can sit behind the same capability trait; this store is the
// shipped implementation for single-operator use.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename for atomicity
// - Corruption detection: JSON validated on load
// - Automatic backup: keeps .backup of the last known good state
// - Recovery: falls back to the backup if corruption is detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "next_id": 3,
//   "records": {
//     "1": { "id": 1, "name": "Ana Silva", ... }
//   }
// }
// ```
//
// The id sequence cursor is persisted alongside the records, so
// identifiers are never reused even after a delete and a restart.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::record_store::{
    NewRecord, Record, RecordChanges, RecordQuery, RecordStore, SortOrder, StatusCounts,
};

/// Store file format version
/// Used for future migration if the format changes
const STORE_FILE_VERSION: &str = "1.0";

/// File-based record store with crash recovery
///
/// Persists records to a JSON file with atomic writes and automatic
/// corruption recovery.
#[derive(Debug)]
pub struct FileRecordStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

/// Internal state for the file-based store
#[derive(Debug)]
struct FileState {
    records: BTreeMap<i64, Record>,
    next_id: i64,
    dirty: bool,
}

/// Serializable store file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StoreFileFormat {
    version: String,
    next_id: i64,
    records: BTreeMap<i64, Record>,
}

impl FileRecordStore {
    /// Create or load a file record store
    ///
    /// This will:
    /// 1. Try to load an existing store file
    /// 2. If corruption is detected, try to load from backup
    /// 3. If both fail, start with empty state
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let (records, next_id) = Self::load_state_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                records,
                next_id,
                dirty: false,
            })),
        })
    }

    /// Load state from file with automatic recovery
    ///
    /// Recovery strategy:
    /// 1. Try to load the main store file
    /// 2. On a parse error, try loading the backup
    /// 3. If the backup also fails, start with empty state
    async fn load_state_with_recovery(path: &Path) -> Result<(BTreeMap<i64, Record>, i64), Error> {
        match Self::load_state(path).await {
            Ok(state) => {
                tracing::debug!("loaded store file: {} records", state.0.len());
                Ok(state)
            }
            Err(e) => {
                let error_str = e.to_string().to_lowercase();
                let looks_corrupted = error_str.contains("json")
                    || error_str.contains("parse")
                    || error_str.contains("expected value")
                    || error_str.contains("eof");
                if !looks_corrupted {
                    return Err(e);
                }

                tracing::warn!(
                    "store file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("no backup file found, starting with empty state");
                    return Ok((BTreeMap::new(), 0));
                }

                match Self::load_state(&backup_path).await {
                    Ok(state) => {
                        tracing::info!("recovered store from backup: {} records", state.0.len());
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "failed to restore store file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(state)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "backup also corrupted: {}. Starting with empty state.",
                            backup_err
                        );
                        Ok((BTreeMap::new(), 0))
                    }
                }
            }
        }
    }

    /// Load state from a single file
    async fn load_state(path: &Path) -> Result<(BTreeMap<i64, Record>, i64), Error> {
        if !path.exists() {
            tracing::debug!("store file does not exist: {}", path.display());
            return Ok((BTreeMap::new(), 0));
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store(format!("failed to read store file {}: {}", path.display(), e))
        })?;

        let store_file: StoreFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::store(format!(
                "failed to parse store file {}: {}",
                path.display(),
                e
            ))
        })?;

        if store_file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "store file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORE_FILE_VERSION,
                store_file.version
            );
        }

        // The cursor must sit at or past the highest stored id; a file
        // edited by hand could otherwise hand out duplicates.
        let max_id = store_file.records.keys().max().copied().unwrap_or(0);
        let next_id = store_file.next_id.max(max_id);

        Ok((store_file.records, next_id))
    }

    /// Write state to the file atomically
    async fn write_state(&self) -> Result<(), Error> {
        let json = {
            let guard = self.state.read().await;
            let store_file = StoreFileFormat {
                version: STORE_FILE_VERSION.to_string(),
                next_id: guard.next_id,
                records: guard.records.clone(),
            };
            serde_json::to_string_pretty(&store_file)
                .map_err(|e| Error::store(format!("failed to serialize store: {}", e)))?
        };

        // Write to a temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Keep a backup of the current file (if it exists)
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("failed to create backup: {}", e);
            }
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        {
            let mut guard = self.state.write().await;
            guard.dirty = false;
        }

        tracing::trace!("store written to file: {}", self.path.display());
        Ok(())
    }

    /// Path to the temporary file used for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Path to the backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Force an immediate write to disk
    pub async fn sync(&self) -> Result<(), Error> {
        self.write_state().await
    }
}

fn sort_records(records: &mut [Record], order: SortOrder) {
    match order {
        SortOrder::IdDesc => records.sort_by(|a, b| b.id.cmp(&a.id)),
        SortOrder::IdAsc => records.sort_by_key(|record| record.id),
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<Record, Error> {
        let record = {
            let mut guard = self.state.write().await;
            guard.next_id += 1;
            let record = record.with_id(guard.next_id);
            guard.records.insert(record.id, record.clone());
            guard.dirty = true;
            record
        };

        // Immediate write for durability
        self.write_state().await?;
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<Record>, Error> {
        let guard = self.state.read().await;
        Ok(guard.records.get(&id).cloned())
    }

    async fn update(&self, id: i64, changes: RecordChanges) -> Result<u64, Error> {
        {
            let mut guard = self.state.write().await;
            match guard.records.get_mut(&id) {
                Some(record) => {
                    changes.apply(record);
                    guard.dirty = true;
                }
                None => return Ok(0),
            }
        }

        self.write_state().await?;
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<u64, Error> {
        {
            let mut guard = self.state.write().await;
            if guard.records.remove(&id).is_none() {
                return Ok(0);
            }
            guard.dirty = true;
        }

        self.write_state().await?;
        Ok(1)
    }

    async fn list(&self, query: RecordQuery) -> Result<Vec<Record>, Error> {
        let guard = self.state.read().await;
        let mut records: Vec<Record> = guard
            .records
            .values()
            .filter(|record| query.status.matches(record))
            .cloned()
            .collect();
        sort_records(&mut records, query.order);
        Ok(records)
    }

    async fn counts(&self) -> Result<StatusCounts, Error> {
        let guard = self.state.read().await;
        let total = guard.records.len() as u64;
        let active = guard.records.values().filter(|r| r.active).count() as u64;
        Ok(StatusCounts {
            total,
            active,
            inactive: total - active,
        })
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty { self.write_state().await } else { Ok(()) }
    }
}
