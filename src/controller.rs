//! Paging controller: the bootstrap state machine.
//!
//! Orchestrates locator, fetcher, partitioner, and store into one bootstrap
//! sequence, then serves page-at-a-time access over the ingested snapshot.
//!
//! States run `Idle → LocatingDataset → Fetching → Partitioning → Ready`.
//! Every locator, fetcher, or partitioner failure lands in `Ready` with an
//! empty (or best-effort partial) snapshot and a cleared loading state
//! rather than an error state; only store failures propagate, since no
//! voter data can be shown without a working store. A
//! single-flight guard keeps a second concurrent bootstrap from issuing
//! duplicate backend calls; it does not cancel an in-flight one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use tokio::task;
use tracing::{debug, info, warn};

use crate::error::{Result, VoterRollError};
use crate::fetch::DatasetFetcher;
use crate::filter::{FilterScope, PageFilter, distinct_genders, distinct_religions};
use crate::locator::DatasetLocator;
use crate::partition::{BatchMessage, BatchPartitioner, PartitionConfig};
use crate::record::VoterRecord;
use crate::session::SessionContext;
use crate::store::SnapshotStore;

/// Records per displayed page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Bootstrap lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// Nothing has happened yet.
    Idle,
    /// Resolving the worker's dataset location.
    LocatingDataset,
    /// Retrieving the bulk dataset.
    Fetching,
    /// Batching and writing the dataset into the store.
    Partitioning,
    /// Snapshot ingested (possibly empty); pages are servable.
    Ready,
}

/// Configuration for the paging controller.
#[derive(Debug, Clone)]
pub struct PagingConfig {
    /// Records per page.
    pub page_size: usize,

    /// Partitioner settings for the ingestion step.
    pub partition: PartitionConfig,
}

impl Default for PagingConfig {
    fn default() -> Self {
        PagingConfig {
            page_size: DEFAULT_PAGE_SIZE,
            partition: PartitionConfig::default(),
        }
    }
}

/// Orchestrates dataset bootstrap and page navigation.
#[derive(Debug)]
pub struct PagingController {
    locator: Arc<dyn DatasetLocator>,
    fetcher: Arc<dyn DatasetFetcher>,
    store: Arc<dyn SnapshotStore>,
    config: PagingConfig,

    state: RwLock<BootstrapState>,
    /// Single-flight guard for the bootstrap sequence.
    initializing: AtomicBool,
    total_count: AtomicUsize,
    current_page: AtomicUsize,
    page_records: RwLock<Vec<VoterRecord>>,
}

impl PagingController {
    /// Create a controller over the given collaborators.
    pub fn new(
        locator: Arc<dyn DatasetLocator>,
        fetcher: Arc<dyn DatasetFetcher>,
        store: Arc<dyn SnapshotStore>,
        config: PagingConfig,
    ) -> Result<Self> {
        if config.page_size == 0 {
            return Err(VoterRollError::invalid_argument("page_size must be non-zero"));
        }

        Ok(PagingController {
            locator,
            fetcher,
            store,
            config,
            state: RwLock::new(BootstrapState::Idle),
            initializing: AtomicBool::new(false),
            total_count: AtomicUsize::new(0),
            current_page: AtomicUsize::new(1),
            page_records: RwLock::new(Vec::new()),
        })
    }

    /// Run the bootstrap sequence: clear the store, resolve the dataset
    /// location, fetch the dataset, partition it into the store, then load
    /// the first page.
    ///
    /// Idempotent under concurrency: while a bootstrap is in flight, further
    /// calls are logged no-ops.
    pub async fn bootstrap(&self, session: &SessionContext) -> Result<()> {
        if self.initializing.swap(true, Ordering::AcqRel) {
            debug!("bootstrap already in progress, skipping");
            return Ok(());
        }

        let result = self.bootstrap_inner(session).await;
        self.initializing.store(false, Ordering::Release);
        result
    }

    async fn bootstrap_inner(&self, session: &SessionContext) -> Result<()> {
        self.set_state(BootstrapState::LocatingDataset);

        // Full-replace semantics: the previous snapshot goes away before any
        // new record arrives.
        self.store.clear()?;

        let Some(worker_id) = session.worker_id() else {
            warn!("session has no worker identity; serving empty snapshot");
            return self.finish_ready();
        };

        let location = match self.locator.resolve(worker_id).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                warn!(worker_id, "no dataset location for worker; serving empty snapshot");
                return self.finish_ready();
            }
            Err(e) => {
                warn!(worker_id, error = %e, "dataset location failed; serving empty snapshot");
                return self.finish_ready();
            }
        };

        self.set_state(BootstrapState::Fetching);
        let records = match self.fetcher.fetch(&location).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "dataset fetch failed; serving empty snapshot");
                return self.finish_ready();
            }
        };

        self.set_state(BootstrapState::Partitioning);
        let handle = match BatchPartitioner::spawn(records, self.config.partition.clone()) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "partitioning failed to start; serving empty snapshot");
                return self.finish_ready();
            }
        };

        let store = Arc::clone(&self.store);
        let ingestion = task::spawn_blocking(move || {
            let mut stored = 0usize;
            while let Some(message) = handle.recv() {
                match message {
                    BatchMessage::Store(batch) => match store.add_batch(&batch) {
                        Ok(()) => stored += batch.len(),
                        // Best-effort ingestion: a failed batch is logged
                        // and the remaining batches still go in.
                        Err(e) => warn!(error = %e, "batch write failed; continuing"),
                    },
                    BatchMessage::Done { batches, records } => {
                        debug!(batches, records, "partitioning complete");
                        break;
                    }
                }
            }
            stored
        })
        .await;

        match ingestion {
            Ok(stored) => info!(stored, "bootstrap ingestion finished"),
            // Like the earlier stages, a failed ingestion task still lands
            // in Ready; whatever was written before the failure stays.
            Err(e) => warn!(error = %e, "ingestion task failed; serving partial snapshot"),
        }
        self.finish_ready()
    }

    /// Read back count and first page, then expose the ready state.
    fn finish_ready(&self) -> Result<()> {
        let count = self.store.count()?;
        let first_page = self.store.get_page(1, self.config.page_size)?;

        self.total_count.store(count, Ordering::Release);
        self.current_page.store(1, Ordering::Release);
        *self.page_records.write() = first_page;
        self.set_state(BootstrapState::Ready);

        info!(count, "voter snapshot ready");
        Ok(())
    }

    /// Navigate to the given 1-based page, clamped to the valid range.
    /// Never re-triggers ingestion. Returns the new page's records.
    pub fn go_to_page(&self, page_number: usize) -> Result<Vec<VoterRecord>> {
        if self.state() != BootstrapState::Ready {
            return Err(VoterRollError::invalid_operation(
                "page navigation requires a completed bootstrap",
            ));
        }

        let clamped = page_number.clamp(1, self.total_pages());
        let records = self.store.get_page(clamped, self.config.page_size)?;

        self.current_page.store(clamped, Ordering::Release);
        *self.page_records.write() = records.clone();
        Ok(records)
    }

    /// Current bootstrap state.
    pub fn state(&self) -> BootstrapState {
        *self.state.read()
    }

    /// Total records in the current snapshot.
    pub fn total_count(&self) -> usize {
        self.total_count.load(Ordering::Acquire)
    }

    /// Currently displayed 1-based page number.
    pub fn current_page(&self) -> usize {
        self.current_page.load(Ordering::Acquire)
    }

    /// Number of pages in the snapshot; at least 1 even when empty.
    pub fn total_pages(&self) -> usize {
        pages_for(self.total_count(), self.config.page_size)
    }

    /// The currently loaded page's records.
    pub fn page_records(&self) -> Vec<VoterRecord> {
        self.page_records.read().clone()
    }

    /// Records visible under the given filter and scope.
    ///
    /// `CurrentPage` narrows only the loaded page, exactly like the source
    /// system; `Snapshot` scans every page of the store.
    pub fn filtered_records(
        &self,
        filter: &PageFilter,
        scope: FilterScope,
    ) -> Result<Vec<VoterRecord>> {
        match scope {
            FilterScope::CurrentPage => Ok(filter.apply(&self.page_records.read())),
            FilterScope::Snapshot => {
                let mut matched = Vec::new();
                for page in 1..=self.total_pages() {
                    let records = self.store.get_page(page, self.config.page_size)?;
                    matched.extend(filter.apply(&records));
                }
                Ok(matched)
            }
        }
    }

    /// Distinct gender values on the loaded page, for dropdown population.
    pub fn page_genders(&self) -> Vec<String> {
        distinct_genders(&self.page_records.read())
    }

    /// Distinct religion values on the loaded page.
    pub fn page_religions(&self) -> Vec<String> {
        distinct_religions(&self.page_records.read())
    }

    fn set_state(&self, next: BootstrapState) {
        let mut state = self.state.write();
        debug!(from = ?*state, to = ?next, "bootstrap state transition");
        *state = next;
    }
}

/// Pages needed for `count` records; at least 1 so an empty snapshot still
/// has a displayable page.
fn pages_for(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size).max(1)
}
