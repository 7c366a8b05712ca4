//! Test doubles and common utilities for the service contract tests
//!
//! Counting fakes that verify the service's interaction rules (what it
//! calls, and when it refuses to) without any real I/O.

use async_trait::async_trait;
use cadastro_core::config::CreateFallbackPolicy;
use cadastro_core::error::{Error, LookupError};
use cadastro_core::service::RecordService;
use cadastro_core::store::MemoryRecordStore;
use cadastro_core::traits::{
    AddressResolver, NewRecord, Record, RecordChanges, RecordQuery, RecordStore, StatusCounts,
    normalize_postal_code,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted outcome for one postal code
#[derive(Debug, Clone)]
pub enum StubOutcome {
    Address(String),
    NotFound,
    Unavailable,
}

/// An AddressResolver driven by a per-code script, counting invocations
///
/// Codes without a scripted outcome get the default. Cloning yields a
/// handle sharing the script and the counter, so tests can keep one
/// while moving the other into the service.
#[derive(Debug, Clone)]
pub struct StubResolver {
    outcomes: Arc<Mutex<HashMap<String, StubOutcome>>>,
    default: StubOutcome,
    call_count: Arc<AtomicUsize>,
}

impl StubResolver {
    /// Resolver answering every code with `default`
    pub fn returning(default: StubOutcome) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            default,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script a specific outcome for one code (normalized form)
    pub fn with_outcome(self, code: &str, outcome: StubOutcome) -> Self {
        let key = normalize_postal_code(code).expect("scripted code must be well-formed");
        self.outcomes.lock().unwrap().insert(key, outcome);
        self
    }

    /// Number of times resolve() was invoked
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressResolver for StubResolver {
    async fn resolve(&self, raw_code: &str) -> Result<String, LookupError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let code = normalize_postal_code(raw_code)?;
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(&code)
            .cloned()
            .unwrap_or_else(|| self.default.clone());
        match outcome {
            StubOutcome::Address(line) => Ok(line),
            StubOutcome::NotFound => Err(LookupError::NotFound),
            StubOutcome::Unavailable => {
                Err(LookupError::Unavailable("stubbed outage".to_string()))
            }
        }
    }

    fn resolver_name(&self) -> &'static str {
        "stub"
    }
}

/// A RecordStore that counts writes while delegating to a memory store
///
/// Cloning shares both the stored records and the counters, so a test
/// can hand one handle to the service and inspect the other.
#[derive(Debug, Clone)]
pub struct CountingStore {
    inner: MemoryRecordStore,
    insert_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryRecordStore::new(),
            insert_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            delete_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn insert(&self, record: NewRecord) -> Result<Record, Error> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(record).await
    }

    async fn get(&self, id: i64) -> Result<Option<Record>, Error> {
        self.inner.get(id).await
    }

    async fn update(&self, id: i64, changes: RecordChanges) -> Result<u64, Error> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<u64, Error> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id).await
    }

    async fn list(&self, query: RecordQuery) -> Result<Vec<Record>, Error> {
        self.inner.list(query).await
    }

    async fn counts(&self) -> Result<StatusCounts, Error> {
        self.inner.counts().await
    }

    async fn flush(&self) -> Result<(), Error> {
        self.inner.flush().await
    }
}

/// Build a service over clones of the given doubles
pub fn service_with(
    store: &CountingStore,
    resolver: &StubResolver,
    policy: CreateFallbackPolicy,
) -> RecordService {
    RecordService::new(Box::new(store.clone()), Box::new(resolver.clone()), policy)
}

/// Service with the default placeholder policy
pub fn default_service(store: &CountingStore, resolver: &StubResolver) -> RecordService {
    service_with(store, resolver, CreateFallbackPolicy::Placeholder)
}
