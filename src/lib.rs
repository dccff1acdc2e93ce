//! # voterroll
//!
//! Voter-roll ingestion and paging pipeline for field-operations
//! dashboards.
//!
//! ## Features
//!
//! - Dataset location resolution via signed object-storage URLs
//! - Single-payload bulk fetch with a strict response schema
//! - Off-thread batch partitioning with incremental store writes
//! - Pluggable snapshot stores (memory, append-only file log)
//! - Page-at-a-time access with scope-aware client-side filtering

pub mod controller;
pub mod details;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod locator;
pub mod partition;
pub mod record;
pub mod session;
pub mod store;

pub mod prelude {
    //! Commonly used types, re-exported.

    pub use crate::controller::{BootstrapState, PagingConfig, PagingController};
    pub use crate::error::{Result, VoterRollError};
    pub use crate::fetch::{DatasetFetcher, HttpDatasetFetcher};
    pub use crate::filter::{FilterScope, PageFilter};
    pub use crate::locator::{DatasetLocator, HttpDatasetLocator};
    pub use crate::record::{VoterDetails, VoterRecord};
    pub use crate::session::SessionContext;
    pub use crate::store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
