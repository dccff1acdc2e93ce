//! In-memory snapshot store implementation.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::warn;

use crate::error::Result;
use crate::record::VoterRecord;
use crate::store::traits::SnapshotStore;

/// Insertion-ordered, identity-keyed record index.
///
/// Upserts keep the original slot of an existing key, so replayed or
/// repeated batches never disturb page layout.
#[derive(Debug, Default)]
pub(crate) struct SnapshotIndex {
    /// Records in insertion order.
    slots: Vec<VoterRecord>,
    /// Identity key -> slot position.
    by_key: HashMap<String, usize>,
}

impl SnapshotIndex {
    pub(crate) fn new() -> Self {
        SnapshotIndex::default()
    }

    /// Insert or overwrite one record. Records without an identity key are
    /// skipped with a warning; ingestion is best-effort.
    pub(crate) fn upsert(&mut self, record: &VoterRecord) {
        let Some(key) = record.identity_key() else {
            warn!("skipping record without identity key");
            return;
        };

        match self.by_key.get(key) {
            Some(&slot) => self.slots[slot] = record.clone(),
            None => {
                self.by_key.insert(key.to_string(), self.slots.len());
                self.slots.push(record.clone());
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.by_key.clear();
    }

    /// The 1-based page slice, empty when out of range.
    pub(crate) fn page(&self, page_number: usize, page_size: usize) -> Vec<VoterRecord> {
        if page_number == 0 || page_size == 0 {
            return Vec::new();
        }

        let start = (page_number - 1).saturating_mul(page_size);
        if start >= self.slots.len() {
            return Vec::new();
        }

        let end = (start + page_size).min(self.slots.len());
        self.slots[start..end].to_vec()
    }
}

/// An in-memory snapshot store.
///
/// The default backend: the source system's per-browser cache is
/// session-scoped, and a snapshot is fully replaced on every bootstrap, so
/// nothing has to outlive the process.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    index: RwLock<SnapshotIndex>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        MemorySnapshotStore {
            index: RwLock::new(SnapshotIndex::new()),
        }
    }

    /// Whether a record with the given identity key is stored.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.read().contains_key(key)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn clear(&self) -> Result<()> {
        self.index.write().clear();
        Ok(())
    }

    fn add_batch(&self, records: &[VoterRecord]) -> Result<()> {
        let mut index = self.index.write();
        for record in records {
            index.upsert(record);
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.index.read().len())
    }

    fn get_page(&self, page_number: usize, page_size: usize) -> Result<Vec<VoterRecord>> {
        Ok(self.index.read().page(page_number, page_size))
    }
}
