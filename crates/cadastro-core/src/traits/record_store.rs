// # Record Store Trait
//
// Defines the persistence capability consumed by the record service.
//
// ## Purpose
//
// The store owns durable record state and identifier assignment:
// - each insert receives the next identifier in a monotonic sequence
// - identifiers are never reused, including after deletes and restarts
// - every update applies its whole change set atomically (all named
//   fields plus the timestamp, or nothing)
//
// ## Implementations
//
// - In-memory: `store::MemoryRecordStore` (tests, throwaway sessions)
// - File-based: `store::FileRecordStore` (JSON, atomic writes, backup)
//
// Stores hold state and perform I/O; they implement no registry rules.
// Validation, enrichment, and merge policy live in the record service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned identifier, stable for the record's lifetime
    pub id: i64,
    /// Display name, 2-60 chars with at least one alphanumeric
    pub name: String,
    /// Free-text description, 3-200 chars
    pub description: String,
    /// Normalized to exactly 8 digits before it reaches the store
    pub postal_code: String,
    /// Derived from the last successful lookup, or a sentinel value;
    /// never empty once the record exists
    pub address_line: String,
    /// Soft-delete flag; false hides the record from the default listing
    pub active: bool,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Touched by every applied mutation
    pub updated_at: DateTime<Utc>,
}

/// A record as handed to the store for insertion; the store assigns the id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub name: String,
    pub description: String,
    pub postal_code: String,
    pub address_line: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewRecord {
    /// Attach the identifier assigned by the store
    pub fn with_id(self, id: i64) -> Record {
        Record {
            id,
            name: self.name,
            description: self.description,
            postal_code: self.postal_code,
            address_line: self.address_line,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Status dimension of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Only records with `active = true` (the default listing view)
    ActiveOnly,
    /// Only records with `active = false`
    InactiveOnly,
    /// Every record regardless of status
    All,
}

impl StatusFilter {
    /// Whether a record passes this filter
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            StatusFilter::ActiveOnly => record.active,
            StatusFilter::InactiveOnly => !record.active,
            StatusFilter::All => true,
        }
    }
}

/// Ordering of query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Highest identifier first (most recently created first)
    #[default]
    IdDesc,
    /// Lowest identifier first
    IdAsc,
}

/// Query specification interpreted by store implementations
///
/// Filter and ordering stay typed end to end, so no store ever
/// interpolates operator input into a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordQuery {
    pub status: StatusFilter,
    pub order: SortOrder,
}

impl RecordQuery {
    /// Query with the given status filter, most recently created first
    pub fn status(status: StatusFilter) -> Self {
        Self {
            status,
            order: SortOrder::IdDesc,
        }
    }
}

/// Field-level change set applied by [`RecordStore::update`]
///
/// `None` fields are left untouched. The store applies the whole set
/// atomically together with `updated_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub postal_code: Option<String>,
    pub address_line: Option<String>,
    pub active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecordChanges {
    /// True when no field (timestamp aside) would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.postal_code.is_none()
            && self.address_line.is_none()
            && self.active.is_none()
    }

    /// Apply the change set to a record in place
    ///
    /// Helper for store implementations; the caller still owns atomicity.
    pub fn apply(&self, record: &mut Record) {
        if let Some(ref name) = self.name {
            record.name = name.clone();
        }
        if let Some(ref description) = self.description {
            record.description = description.clone();
        }
        if let Some(ref postal_code) = self.postal_code {
            record.postal_code = postal_code.clone();
        }
        if let Some(ref address_line) = self.address_line {
            record.address_line = address_line.clone();
        }
        if let Some(active) = self.active {
            record.active = active;
        }
        if let Some(updated_at) = self.updated_at {
            record.updated_at = updated_at;
        }
    }
}

/// Aggregate record counts by status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

/// Trait for record store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks,
/// even though the console front-end issues one operation at a time.
///
/// # Atomicity
///
/// `update` either applies its full change set or leaves the record
/// untouched; a partially-applied change set must never be observable.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record, assigning the next identifier
    ///
    /// # Returns
    ///
    /// - `Ok(Record)`: the persisted record including its identifier
    /// - `Err(Error)`: storage error
    async fn insert(&self, record: NewRecord) -> Result<Record, crate::Error>;

    /// Fetch a record by identifier
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Record))`: the record
    /// - `Ok(None)`: no record with that identifier
    /// - `Err(Error)`: storage error
    async fn get(&self, id: i64) -> Result<Option<Record>, crate::Error>;

    /// Apply a change set atomically
    ///
    /// # Returns
    ///
    /// - `Ok(count)`: affected-record count (0 when the id is unknown)
    /// - `Err(Error)`: storage error
    async fn update(&self, id: i64, changes: RecordChanges) -> Result<u64, crate::Error>;

    /// Remove a record permanently
    ///
    /// # Returns
    ///
    /// - `Ok(count)`: affected-record count (0 when the id is unknown)
    /// - `Err(Error)`: storage error
    async fn delete(&self, id: i64) -> Result<u64, crate::Error>;

    /// List records matching a query specification
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Record>)`: the full matching set, ordered per the query
    /// - `Err(Error)`: storage error
    async fn list(&self, query: RecordQuery) -> Result<Vec<Record>, crate::Error>;

    /// Count records by status
    async fn counts(&self) -> Result<StatusCounts, crate::Error>;

    /// Persist any pending changes
    ///
    /// Some implementations may buffer writes. This ensures all changes
    /// are flushed to durable storage.
    async fn flush(&self) -> Result<(), crate::Error>;
}
