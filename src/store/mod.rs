//! Local embedded snapshot store.
//!
//! Holds the records of exactly one dataset snapshot at a time, keyed by
//! voter identity, in insertion order. Supports clearing, idempotent batch
//! insertion, counting, and page-range reads.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use traits::{SnapshotStore, StoreConfig};
