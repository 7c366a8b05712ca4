// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for tests and for throwaway console sessions where durability
// doesn't matter.
//
// ## Identifier Policy
//
// The sequence counter only ever moves forward, so an identifier freed
// by delete is never handed out again within the store's lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use async_trait::async_trait;

use crate::Error;
use crate::traits::record_store::{
    NewRecord, Record, RecordChanges, RecordQuery, RecordStore, SortOrder, StatusCounts,
};

/// In-memory record store implementation
///
/// All state lives in a HashMap behind a RwLock. Cloning yields a handle
/// to the same underlying state.
#[derive(Debug, Clone)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: HashMap<i64, Record>,
    next_id: i64,
}

impl MemoryRecordStore {
    /// Create a new empty memory record store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryState::default())),
        }
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    /// Clear all records (the id sequence keeps advancing)
    pub async fn clear(&self) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.records.clear();
        Ok(())
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_records(records: &mut [Record], order: SortOrder) {
    match order {
        SortOrder::IdDesc => records.sort_by(|a, b| b.id.cmp(&a.id)),
        SortOrder::IdAsc => records.sort_by_key(|record| record.id),
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<Record, Error> {
        let mut guard = self.inner.write().await;
        guard.next_id += 1;
        let record = record.with_id(guard.next_id);
        guard.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<Record>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.records.get(&id).cloned())
    }

    async fn update(&self, id: i64, changes: RecordChanges) -> Result<u64, Error> {
        let mut guard = self.inner.write().await;
        match guard.records.get_mut(&id) {
            Some(record) => {
                changes.apply(record);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64, Error> {
        let mut guard = self.inner.write().await;
        Ok(guard.records.remove(&id).map_or(0, |_| 1))
    }

    async fn list(&self, query: RecordQuery) -> Result<Vec<Record>, Error> {
        let guard = self.inner.read().await;
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
        let guard = self.inner.read().await;
        let total = guard.records.len() as u64;
        let active = guard.records.values().filter(|r| r.active).count() as u64;
        Ok(StatusCounts {
            total,
            active,
            inactive: total - active,
        })
    }

    async fn flush(&self) -> Result<(), Error> {
        // No-op for memory store (everything is already "persisted")
        Ok(())
    }
}
