//! Snapshot store abstraction and common types.

use crate::error::Result;
use crate::record::VoterRecord;

/// A store holding the current dataset snapshot.
///
/// This provides a pluggable interface for different backends, like memory
/// or an on-disk snapshot log. Iteration order is insertion order, which
/// the ingestion path establishes in document order of the source dataset;
/// pages are computed from that order on demand.
pub trait SnapshotStore: Send + Sync + std::fmt::Debug {
    /// Remove all records, guaranteeing full-replace semantics for the next
    /// ingestion.
    fn clear(&self) -> Result<()>;

    /// Insert or overwrite the given records, keyed by identity.
    ///
    /// Idempotent: re-inserting an already-stored key overwrites the record
    /// in place, keeping its original position and leaving the count
    /// unchanged. Each batch write is independent, so out-of-order or
    /// repeated batch arrivals cannot corrupt the store.
    fn add_batch(&self, records: &[VoterRecord]) -> Result<()>;

    /// Total records currently stored.
    fn count(&self) -> Result<usize>;

    /// The 1-based page `page_number` of size `page_size`, in insertion
    /// order. Out-of-range pages (including page 0) return an empty vec,
    /// never an error.
    fn get_page(&self, page_number: usize, page_size: usize) -> Result<Vec<VoterRecord>>;
}

/// Configuration for store backends.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Whether to sync writes to disk immediately (file backend only).
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig { sync_writes: false }
    }
}
