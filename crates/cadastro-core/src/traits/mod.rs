//! Core traits for the cadastro system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressResolver`]: translate a postal code into an address line
//! - [`RecordStore`]: persist and retrieve registration records

pub mod address_resolver;
pub mod record_store;

pub use address_resolver::{ADDRESS_NOT_INFORMED, AddressResolver, normalize_postal_code};
pub use record_store::{
    NewRecord, Record, RecordChanges, RecordQuery, RecordStore, SortOrder, StatusCounts,
    StatusFilter,
};
