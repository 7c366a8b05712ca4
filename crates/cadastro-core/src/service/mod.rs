//! Record lifecycle service
//!
//! The RecordService owns the rules of the registry:
//! - field validation before any lookup or write
//! - address enrichment through an injected [`AddressResolver`]
//! - the partial-update merge policy
//! - status-driven visibility for listing, search, and export
//!
//! ## Architecture
//!
//! ```text
//!                  ┌───────────────┐
//!   console ─────▶ │ RecordService │
//!                  └───────────────┘
//!                     │          │
//!                     ▼          ▼
//!          ┌─────────────┐  ┌─────────────────┐
//!          │ RecordStore │  │ AddressResolver │
//!          │ (persist)   │  │ (enrich)        │
//!          └─────────────┘  └─────────────────┘
//! ```
//!
//! ## Enrichment policy
//!
//! Create and update treat a failed lookup differently, on purpose:
//! create keeps the record and stores a failure placeholder (enrichment
//! is best-effort, not a precondition), while update leaves BOTH the
//! stored postal code and the stored address line untouched when the new
//! code does not resolve. A record never downgrades a previously good
//! address because the lookup service had a bad day.

use crate::config::CreateFallbackPolicy;
use crate::error::{Error, LookupError, Result};
use crate::export::{self, ExportOutcome};
use crate::traits::{
    AddressResolver, NewRecord, Record, RecordChanges, RecordQuery, RecordStore, StatusCounts,
    StatusFilter, normalize_postal_code,
};
use crate::validation::{validate_description, validate_name};
use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, warn};

/// Address line stored by create when the lookup failed and the
/// placeholder policy is active.
pub const ADDRESS_LOOKUP_FAILED: &str = "lookup failed";

/// Operator input for a partial update
///
/// `None` or blank fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub postal_code: Option<String>,
}

/// Result of an update call
///
/// `NoChanges` is a signal, not an error: the request was well-formed
/// but nothing would have changed, so nothing was written.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// At least one field changed and was persisted
    Applied(Record),
    /// Nothing to change; no write was performed
    NoChanges(Record),
}

impl UpdateOutcome {
    /// The record as of this call, applied or not
    pub fn record(&self) -> &Record {
        match self {
            UpdateOutcome::Applied(record) | UpdateOutcome::NoChanges(record) => record,
        }
    }
}

/// Record lifecycle service
///
/// Constructed once with its collaborators injected; holds no record
/// state of its own. Every operation runs to completion before the
/// caller issues the next one.
pub struct RecordService {
    store: Box<dyn RecordStore>,
    resolver: Box<dyn AddressResolver>,
    create_fallback: CreateFallbackPolicy,
}

impl RecordService {
    /// Create a new record service
    ///
    /// # Parameters
    ///
    /// - `store`: record persistence implementation
    /// - `resolver`: address lookup implementation
    /// - `create_fallback`: what create does when the lookup fails
    pub fn new(
        store: Box<dyn RecordStore>,
        resolver: Box<dyn AddressResolver>,
        create_fallback: CreateFallbackPolicy,
    ) -> Self {
        Self {
            store,
            resolver,
            create_fallback,
        }
    }

    /// Create a record, enriching it with a resolved address line
    ///
    /// Name and description are validated first; a malformed postal code
    /// is a validation failure and nothing is persisted. A code that is
    /// well-formed but does not resolve is handled per the configured
    /// fallback policy: the default stores [`ADDRESS_LOOKUP_FAILED`] and
    /// keeps the record, the abort policy fails the whole create.
    pub async fn create(&self, name: &str, description: &str, postal_code: &str) -> Result<Record> {
        validate_name(name)?;
        validate_description(description)?;
        let normalized = normalize_postal_code(postal_code)
            .map_err(|_| Error::validation("postal_code", "must contain exactly 8 digits"))?;

        let address_line = match self.resolver.resolve(postal_code).await {
            Ok(line) => line,
            Err(LookupError::InvalidFormat) => {
                return Err(Error::validation(
                    "postal_code",
                    "must contain exactly 8 digits",
                ));
            }
            Err(err) => match self.create_fallback {
                CreateFallbackPolicy::Placeholder => {
                    warn!(
                        resolver = self.resolver.resolver_name(),
                        %err,
                        "address lookup failed, storing placeholder line"
                    );
                    ADDRESS_LOOKUP_FAILED.to_string()
                }
                CreateFallbackPolicy::Abort => return Err(err.into()),
            },
        };

        let now = Utc::now();
        let record = self
            .store
            .insert(NewRecord {
                name: name.trim().to_string(),
                description: description.trim().to_string(),
                postal_code: normalized,
                address_line,
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(id = record.id, "record created");
        Ok(record)
    }

    /// Apply a partial update
    ///
    /// An unknown id fails before any field validation. Supplied fields
    /// are validated with the create rules; any failure aborts the whole
    /// update with no write. The resolver is re-invoked only when a
    /// supplied postal code differs from the stored one; if that lookup
    /// fails with not-found/unavailable, both stored address fields are
    /// retained and only the other supplied fields (if any) are applied.
    pub async fn update(&self, id: i64, request: UpdateRequest) -> Result<UpdateOutcome> {
        let current = self.store.get(id).await?.ok_or(Error::NotFound(id))?;

        let name = supplied(request.name);
        let description = supplied(request.description);
        let postal_code = supplied(request.postal_code);

        if let Some(ref name) = name {
            validate_name(name)?;
        }
        if let Some(ref description) = description {
            validate_description(description)?;
        }

        let mut changes = RecordChanges::default();

        if let Some(name) = name {
            let name = name.trim().to_string();
            if name != current.name {
                changes.name = Some(name);
            }
        }
        if let Some(description) = description {
            let description = description.trim().to_string();
            if description != current.description {
                changes.description = Some(description);
            }
        }

        if let Some(ref code) = postal_code {
            let normalized = normalize_postal_code(code)
                .map_err(|_| Error::validation("postal_code", "must contain exactly 8 digits"))?;
            if normalized != current.postal_code {
                match self.resolver.resolve(code).await {
                    Ok(line) => {
                        changes.postal_code = Some(normalized);
                        changes.address_line = Some(line);
                    }
                    Err(LookupError::InvalidFormat) => {
                        return Err(Error::validation(
                            "postal_code",
                            "must contain exactly 8 digits",
                        ));
                    }
                    Err(err) => {
                        // Unresolvable new code: keep the stored postal code
                        // and address line exactly as they were.
                        warn!(
                            id,
                            resolver = self.resolver.resolver_name(),
                            %err,
                            "new postal code did not resolve; keeping stored address fields"
                        );
                    }
                }
            }
        }

        if changes.is_empty() {
            debug!(id, "update produced no changes");
            return Ok(UpdateOutcome::NoChanges(current));
        }

        changes.updated_at = Some(Utc::now());
        let affected = self.store.update(id, changes).await?;
        if affected == 0 {
            return Err(Error::NotFound(id));
        }

        let record = self.store.get(id).await?.ok_or(Error::NotFound(id))?;
        info!(id, "record updated");
        Ok(UpdateOutcome::Applied(record))
    }

    /// Set the active flag
    ///
    /// Idempotent with respect to the end state: setting the flag to its
    /// current value is still a successful write and touches `updated_at`.
    pub async fn set_active(&self, id: i64, active: bool) -> Result<Record> {
        let changes = RecordChanges {
            active: Some(active),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        let affected = self.store.update(id, changes).await?;
        if affected == 0 {
            return Err(Error::NotFound(id));
        }

        let record = self.store.get(id).await?.ok_or(Error::NotFound(id))?;
        info!(id, active, "record status set");
        Ok(record)
    }

    /// Permanently remove a record
    ///
    /// Irreversible. An unknown id fails with `NotFound` and leaves the
    /// store untouched.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let affected = self.store.delete(id).await?;
        if affected == 0 {
            return Err(Error::NotFound(id));
        }
        info!(id, "record deleted");
        Ok(())
    }

    /// Fetch a single record
    pub async fn get(&self, id: i64) -> Result<Record> {
        self.store.get(id).await?.ok_or(Error::NotFound(id))
    }

    /// List records matching a query specification
    pub async fn query(&self, query: RecordQuery) -> Result<Vec<Record>> {
        self.store.list(query).await
    }

    /// Search by identifier or text
    ///
    /// Matches exact identifier equality OR case-insensitive substring
    /// containment against name, description, or address line. Inactive
    /// records are searchable; an empty result is a valid outcome.
    pub async fn search(&self, term: &str) -> Result<Vec<Record>> {
        let term = term.trim();
        let id_match: Option<i64> = term.parse().ok();
        let needle = term.to_lowercase();

        let records = self
            .store
            .list(RecordQuery::status(StatusFilter::All))
            .await?;

        Ok(records
            .into_iter()
            .filter(|record| {
                id_match == Some(record.id)
                    || (!needle.is_empty()
                        && (record.name.to_lowercase().contains(&needle)
                            || record.description.to_lowercase().contains(&needle)
                            || record.address_line.to_lowercase().contains(&needle)))
            })
            .collect())
    }

    /// Export the records matching a status filter to a JSON artifact
    ///
    /// Zero matching records is reported as [`ExportOutcome::NothingToExport`]
    /// and no file is written.
    pub async fn export(&self, status: StatusFilter, directory: &Path) -> Result<ExportOutcome> {
        let records = self.store.list(RecordQuery::status(status)).await?;
        if records.is_empty() {
            info!(filter = ?status, "no records matched; nothing exported");
            return Ok(ExportOutcome::NothingToExport);
        }

        let count = records.len();
        let path = export::write_artifact(directory, status, &records).await?;
        info!(count, path = %path.display(), "records exported");
        Ok(ExportOutcome::Written { path, count })
    }

    /// Count records by status (drives the console dashboard)
    pub async fn counts(&self) -> Result<StatusCounts> {
        self.store.counts().await
    }

    /// Flush the underlying store
    pub async fn flush(&self) -> Result<()> {
        self.store.flush().await
    }
}

/// Treat blank operator input as "not supplied"
fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
