//! Integration tests for the bootstrap and paging pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use voterroll::controller::{BootstrapState, PagingConfig, PagingController};
use voterroll::error::{Result, VoterRollError};
use voterroll::fetch::DatasetFetcher;
use voterroll::filter::{FilterScope, PageFilter};
use voterroll::locator::DatasetLocator;
use voterroll::partition::PartitionConfig;
use voterroll::record::VoterRecord;
use voterroll::session::SessionContext;
use voterroll::store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore, StoreConfig};

/// Locator answering with a fixed location and counting calls.
#[derive(Debug)]
struct StaticLocator {
    url: Option<String>,
    calls: AtomicUsize,
}

impl StaticLocator {
    fn some() -> Self {
        StaticLocator {
            url: Some("https://bucket.example/voters.json?sig=test".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn none() -> Self {
        StaticLocator {
            url: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetLocator for StaticLocator {
    async fn resolve(&self, _worker_id: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.url.clone())
    }
}

/// Fetcher serving a fixed dataset, optionally slowly or failing.
#[derive(Debug)]
struct StaticFetcher {
    records: Vec<VoterRecord>,
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticFetcher {
    fn with_records(records: Vec<VoterRecord>) -> Self {
        StaticFetcher {
            records,
            delay: Duration::ZERO,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(records: Vec<VoterRecord>, delay: Duration) -> Self {
        StaticFetcher {
            delay,
            ..Self::with_records(records)
        }
    }

    fn failing() -> Self {
        StaticFetcher {
            fail: true,
            ..Self::with_records(Vec::new())
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<VoterRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(VoterRollError::fetch("connection reset"));
        }
        Ok(self.records.clone())
    }
}

/// Store delegating to a memory store, failing one `add_batch` call.
#[derive(Debug)]
struct FlakyStore {
    inner: MemorySnapshotStore,
    fail_call: usize,
    calls: AtomicUsize,
}

impl FlakyStore {
    fn failing_on(fail_call: usize) -> Self {
        FlakyStore {
            inner: MemorySnapshotStore::new(),
            fail_call,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SnapshotStore for FlakyStore {
    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn add_batch(&self, records: &[VoterRecord]) -> Result<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_call {
            return Err(VoterRollError::storage("injected batch failure"));
        }
        self.inner.add_batch(records)
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn get_page(&self, page_number: usize, page_size: usize) -> Result<Vec<VoterRecord>> {
        self.inner.get_page(page_number, page_size)
    }
}

fn make_records(count: usize) -> Vec<VoterRecord> {
    (0..count)
        .map(|i| VoterRecord {
            voter_id: Some(format!("V{i:04}")),
            voter_full_name: Some(format!("Voter {i}")),
            gender: Some(if i % 2 == 0 { "Female" } else { "Male" }.to_string()),
            ..Default::default()
        })
        .collect()
}

fn controller_over(
    locator: Arc<StaticLocator>,
    fetcher: Arc<StaticFetcher>,
    store: Arc<dyn SnapshotStore>,
    page_size: usize,
) -> PagingController {
    PagingController::new(
        locator,
        fetcher,
        store,
        PagingConfig {
            page_size,
            partition: PartitionConfig {
                batch_size: 7,
                channel_capacity: 2,
            },
        },
    )
    .unwrap()
}

#[tokio::test]
async fn test_scenario_three_records_page_size_two() {
    let records = vec![
        VoterRecord {
            voter_id: Some("E1".to_string()),
            voter_full_name: Some("A".to_string()),
            ..Default::default()
        },
        VoterRecord {
            voter_id: Some("E2".to_string()),
            voter_full_name: Some("B".to_string()),
            ..Default::default()
        },
        VoterRecord {
            voter_id: Some("E3".to_string()),
            voter_full_name: Some("C".to_string()),
            ..Default::default()
        },
    ];

    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let controller = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(records)),
        Arc::clone(&store),
        2,
    );

    controller.bootstrap(&SessionContext::new("1")).await.unwrap();

    assert_eq!(controller.state(), BootstrapState::Ready);
    assert_eq!(controller.total_count(), 3);
    assert_eq!(controller.total_pages(), 2);

    let page1 = controller.page_records();
    let ids: Vec<_> = page1.iter().filter_map(|r| r.identity_key()).collect();
    assert_eq!(ids, vec!["E1", "E2"]);

    let page2 = controller.go_to_page(2).unwrap();
    assert_eq!(page2.len(), 1);
    assert_eq!(page2[0].identity_key(), Some("E3"));

    // Out-of-range read straight from the store is empty, never an error.
    assert!(store.get_page(3, 2).unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_semantics_across_bootstraps() {
    let store = Arc::new(MemorySnapshotStore::new());
    let dyn_store: Arc<dyn SnapshotStore> = Arc::clone(&store) as Arc<dyn SnapshotStore>;

    let first = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(make_records(30))),
        Arc::clone(&dyn_store),
        50,
    );
    first.bootstrap(&SessionContext::new("1")).await.unwrap();
    assert_eq!(first.total_count(), 30);
    assert!(store.contains_key("V0029"));

    let replacement = vec![
        VoterRecord {
            voter_id: Some("NEW1".to_string()),
            ..Default::default()
        },
        VoterRecord {
            voter_id: Some("NEW2".to_string()),
            ..Default::default()
        },
    ];
    let second = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(replacement)),
        Arc::clone(&dyn_store),
        50,
    );
    second.bootstrap(&SessionContext::new("1")).await.unwrap();

    assert_eq!(second.total_count(), 2);
    assert!(!store.contains_key("V0000"));
    assert!(!store.contains_key("V0029"));
    assert!(store.contains_key("NEW1"));
}

#[tokio::test]
async fn test_order_preservation_and_page_boundaries() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let controller = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(make_records(120))),
        Arc::clone(&store),
        50,
    );

    controller.bootstrap(&SessionContext::new("1")).await.unwrap();

    assert_eq!(controller.total_count(), 120);
    assert_eq!(controller.total_pages(), 3);

    let page1 = controller.page_records();
    assert_eq!(page1.len(), 50);
    assert_eq!(page1[0].identity_key(), Some("V0000"));
    assert_eq!(page1[49].identity_key(), Some("V0049"));

    let page3 = controller.go_to_page(3).unwrap();
    assert_eq!(page3.len(), 20);
    assert_eq!(page3[0].identity_key(), Some("V0100"));
    assert_eq!(page3[19].identity_key(), Some("V0119"));

    assert!(store.get_page(4, 50).unwrap().is_empty());

    // Navigation clamps instead of erroring.
    let clamped = controller.go_to_page(99).unwrap();
    assert_eq!(controller.current_page(), 3);
    assert_eq!(clamped.len(), 20);

    let first = controller.go_to_page(0).unwrap();
    assert_eq!(controller.current_page(), 1);
    assert_eq!(first[0].identity_key(), Some("V0000"));
}

#[tokio::test]
async fn test_single_flight_bootstrap() {
    let locator = Arc::new(StaticLocator::some());
    let fetcher = Arc::new(StaticFetcher::slow(
        make_records(10),
        Duration::from_millis(100),
    ));
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());

    let controller = Arc::new(controller_over(
        Arc::clone(&locator),
        Arc::clone(&fetcher),
        store,
        50,
    ));

    let a = Arc::clone(&controller);
    let b = Arc::clone(&controller);
    let session = SessionContext::new("1");
    let session_b = session.clone();

    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { a.bootstrap(&session).await }),
        tokio::spawn(async move { b.bootstrap(&session_b).await }),
    );
    ra.unwrap().unwrap();
    rb.unwrap().unwrap();

    assert_eq!(locator.calls(), 1);
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(controller.state(), BootstrapState::Ready);
    assert_eq!(controller.total_count(), 10);
}

#[tokio::test]
async fn test_empty_ready_state_on_missing_location() {
    let locator = Arc::new(StaticLocator::none());
    let fetcher = Arc::new(StaticFetcher::with_records(make_records(5)));
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());

    let controller = controller_over(Arc::clone(&locator), Arc::clone(&fetcher), store, 50);
    controller.bootstrap(&SessionContext::new("1")).await.unwrap();

    assert_eq!(controller.state(), BootstrapState::Ready);
    assert_eq!(controller.total_count(), 0);
    assert_eq!(controller.total_pages(), 1);
    assert!(controller.page_records().is_empty());
    assert_eq!(locator.calls(), 1);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_empty_ready_state_on_missing_identity() {
    let locator = Arc::new(StaticLocator::some());
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let controller = controller_over(
        Arc::clone(&locator),
        Arc::new(StaticFetcher::with_records(make_records(5))),
        store,
        50,
    );

    controller.bootstrap(&SessionContext::anonymous()).await.unwrap();

    assert_eq!(controller.state(), BootstrapState::Ready);
    assert_eq!(controller.total_count(), 0);
    assert_eq!(locator.calls(), 0);
}

#[tokio::test]
async fn test_fetch_failure_is_absorbed() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let controller = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::failing()),
        store,
        50,
    );

    controller.bootstrap(&SessionContext::new("1")).await.unwrap();

    assert_eq!(controller.state(), BootstrapState::Ready);
    assert_eq!(controller.total_count(), 0);
}

#[tokio::test]
async fn test_partition_stage_failure_is_absorbed() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let controller = PagingController::new(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(make_records(10))),
        store,
        PagingConfig {
            page_size: 50,
            partition: PartitionConfig {
                batch_size: 0,
                channel_capacity: 2,
            },
        },
    )
    .unwrap();

    // The partitioner rejects a zero batch size; the controller still
    // settles into an empty ready state instead of erroring mid-machine.
    controller.bootstrap(&SessionContext::new("1")).await.unwrap();

    assert_eq!(controller.state(), BootstrapState::Ready);
    assert_eq!(controller.total_count(), 0);
    assert!(controller.page_records().is_empty());
}

#[tokio::test]
async fn test_failed_batch_write_skips_only_that_batch() {
    // 20 records in batches of 7 -> three add_batch calls; the middle one
    // fails, the records on either side still land.
    let store = Arc::new(FlakyStore::failing_on(1));
    let controller = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(make_records(20))),
        Arc::clone(&store) as Arc<dyn SnapshotStore>,
        50,
    );

    controller.bootstrap(&SessionContext::new("1")).await.unwrap();

    assert_eq!(controller.state(), BootstrapState::Ready);
    assert_eq!(controller.total_count(), 13);

    let page = controller.page_records();
    let ids: Vec<_> = page.iter().filter_map(|r| r.identity_key()).collect();
    assert_eq!(ids[0..7], ["V0000", "V0001", "V0002", "V0003", "V0004", "V0005", "V0006"]);
    assert_eq!(ids[7], "V0014");
    assert_eq!(ids[12], "V0019");
    assert!(!ids.contains(&"V0007"));
}

#[tokio::test]
async fn test_navigation_before_bootstrap_is_rejected() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let controller = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(Vec::new())),
        store,
        50,
    );

    assert_eq!(controller.state(), BootstrapState::Idle);
    assert!(controller.go_to_page(1).is_err());
}

#[tokio::test]
async fn test_filter_scopes_differ() {
    // The only "Singh" lives on page 2.
    let mut records = make_records(60);
    records[55].voter_full_name = Some("Devi Singh".to_string());

    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let controller = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(records)),
        Arc::clone(&store),
        50,
    );
    controller.bootstrap(&SessionContext::new("1")).await.unwrap();

    let filter = PageFilter {
        search: Some("singh".to_string()),
        ..Default::default()
    };

    // Page-scoped filtering sees nothing on page 1.
    let visible = controller
        .filtered_records(&filter, FilterScope::CurrentPage)
        .unwrap();
    assert!(visible.is_empty());

    // Snapshot-scoped filtering finds it regardless of the loaded page.
    let all = controller
        .filtered_records(&filter, FilterScope::Snapshot)
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].identity_key(), Some("V0055"));

    // After navigating to page 2 the page-scoped filter finds it too.
    controller.go_to_page(2).unwrap();
    let visible = controller
        .filtered_records(&filter, FilterScope::CurrentPage)
        .unwrap();
    assert_eq!(visible.len(), 1);
}

#[tokio::test]
async fn test_dropdown_values_come_from_loaded_page() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let controller = controller_over(
        Arc::new(StaticLocator::some()),
        Arc::new(StaticFetcher::with_records(make_records(10))),
        store,
        50,
    );
    controller.bootstrap(&SessionContext::new("1")).await.unwrap();

    assert_eq!(controller.page_genders(), vec!["Female", "Male"]);
    assert!(controller.page_religions().is_empty());
}

#[tokio::test]
async fn test_bootstrap_into_file_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.log");

    {
        let store: Arc<dyn SnapshotStore> =
            Arc::new(FileSnapshotStore::open(&path, StoreConfig::default()).unwrap());
        let controller = controller_over(
            Arc::new(StaticLocator::some()),
            Arc::new(StaticFetcher::with_records(make_records(23))),
            store,
            50,
        );
        controller.bootstrap(&SessionContext::new("1")).await.unwrap();
        assert_eq!(controller.total_count(), 23);
    }

    let reopened = FileSnapshotStore::open(&path, StoreConfig::default()).unwrap();
    assert_eq!(reopened.count().unwrap(), 23);
    let page = reopened.get_page(1, 50).unwrap();
    assert_eq!(page[0].identity_key(), Some("V0000"));
    assert_eq!(page[22].identity_key(), Some("V0022"));
}
