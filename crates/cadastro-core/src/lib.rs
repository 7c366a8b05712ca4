// # cadastro-core
//
// Core library for the cadastro record registry.
//
// ## Architecture Overview
//
// This library provides the record lifecycle and enrichment workflow:
// - **AddressResolver**: trait for postal-code → address-line lookups
// - **RecordStore**: trait for record persistence and id assignment
// - **RecordService**: the lifecycle owner: create, partial update,
//   status toggle, permanent delete, query/search/export
// - Built-in stores: in-memory and JSON-file backed
//
// ## Design Principles
//
// 1. **Separation of Concerns**: registry rules are separate from I/O
//    implementations; the external lookup and the store are injected
// 2. **Library-First**: everything here can be embedded without the
//    console front-end (see the demos/ workspace member)
// 3. **Best-Effort Enrichment**: a failed lookup degrades the address
//    field, never the record lifecycle itself

pub mod config;
pub mod error;
pub mod export;
pub mod service;
pub mod store;
pub mod traits;
pub mod validation;

// Re-export core types for convenience
pub use config::{CadastroConfig, CreateFallbackPolicy, LookupConfig, ServiceConfig, StoreConfig};
pub use error::{Error, LookupError, Result};
pub use export::ExportOutcome;
pub use service::{ADDRESS_LOOKUP_FAILED, RecordService, UpdateOutcome, UpdateRequest};
pub use store::{FileRecordStore, MemoryRecordStore};
pub use traits::{
    ADDRESS_NOT_INFORMED, AddressResolver, NewRecord, Record, RecordChanges, RecordQuery,
    RecordStore, SortOrder, StatusCounts, StatusFilter, normalize_postal_code,
};
