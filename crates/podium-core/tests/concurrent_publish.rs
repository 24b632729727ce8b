//! Version allocation under concurrent publishers.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use podium_core::{
    HackathonId, PreviewBuilder, PublishCode, PublishRequest, PublisherConfig, SnapshotPublisher,
    TeamId, UserId,
};
use podium_state::fakes::{MemoryHackathonData, MemorySnapshotStore};
use podium_state::{Evaluation, SnapshotRecord, SnapshotStore, StorageResult, Team};

const H: HackathonId = HackathonId(11);

fn scored_hackathon() -> Arc<MemoryHackathonData> {
    let data = Arc::new(MemoryHackathonData::new());
    data.add_team(Team {
        team_id: TeamId(1),
        hackathon_id: H,
        name: "Solo".to_string(),
        created_at: Utc::now(),
    });
    data.add_evaluation(Evaluation::new(UserId(5), TeamId(1), H, 7, Utc::now()).unwrap());
    data
}

/// Loses the first `rival_wins` inserts to a faster publisher that takes the
/// same version just before us.
struct ContendedStore {
    inner: MemorySnapshotStore,
    rival_wins: AtomicU32,
}

impl ContendedStore {
    fn new(rival_wins: u32) -> Self {
        Self {
            inner: MemorySnapshotStore::new(),
            rival_wins: AtomicU32::new(rival_wins),
        }
    }
}

#[async_trait]
impl SnapshotStore for ContendedStore {
    async fn max_version(&self, hackathon_id: HackathonId) -> StorageResult<Option<u32>> {
        self.inner.max_version(hackathon_id).await
    }

    async fn latest(&self, hackathon_id: HackathonId) -> StorageResult<Option<SnapshotRecord>> {
        self.inner.latest(hackathon_id).await
    }

    async fn get(
        &self,
        hackathon_id: HackathonId,
        version: u32,
    ) -> StorageResult<Option<SnapshotRecord>> {
        self.inner.get(hackathon_id, version).await
    }

    async fn history(&self, hackathon_id: HackathonId) -> StorageResult<Vec<SnapshotRecord>> {
        self.inner.history(hackathon_id).await
    }

    async fn insert(&self, record: SnapshotRecord) -> StorageResult<SnapshotRecord> {
        let rival_turn = self
            .rival_wins
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rival_turn {
            let rival =
                SnapshotRecord::new(record.hackathon_id, record.version, record.payload.clone())?;
            self.inner.insert(rival).await?;
        }
        self.inner.insert(record).await
    }
}

fn publisher(store: Arc<dyn SnapshotStore>, max_attempts: u32) -> SnapshotPublisher {
    SnapshotPublisher::new(
        PreviewBuilder::from_source(scored_hackathon()),
        store,
        PublisherConfig::with_max_attempts(max_attempts).unwrap(),
    )
}

#[tokio::test]
async fn conflict_is_retried_with_the_next_version() {
    let store = Arc::new(ContendedStore::new(2));
    let publisher = publisher(store.clone(), 3);

    let result = publisher
        .publish(&PublishRequest::new(H, UserId(1)))
        .await
        .expect("publish");

    assert!(result.success);
    assert_eq!(result.version, Some(3));
    let ours = publisher.snapshot(H, 3).await.unwrap().unwrap();
    assert_eq!(ours.payload.version, 3);
    assert_eq!(ours.payload.publisher_id, UserId(1));
}

#[tokio::test]
async fn exhausted_retry_budget_reports_conflict() {
    let store = Arc::new(ContendedStore::new(3));
    let publisher = publisher(store.clone(), 3);

    let result = publisher
        .publish(&PublishRequest::new(H, UserId(1)))
        .await
        .expect("publish");

    assert!(!result.success);
    assert_eq!(result.code, PublishCode::PublishConflict);
    assert!(result.code.is_retryable());
    // Only the rival's three snapshots exist.
    assert_eq!(store.inner.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishers_get_unique_gap_free_versions() {
    const PUBLISHERS: u32 = 8;
    let store = Arc::new(MemorySnapshotStore::new());
    // Every lost race means another publisher took a version, so this many
    // attempts always suffice.
    let publisher = Arc::new(publisher(store.clone(), PUBLISHERS));

    let handles = (0..PUBLISHERS).map(|i| {
        let publisher = publisher.clone();
        tokio::spawn(async move {
            publisher
                .publish(&PublishRequest::new(H, UserId(i64::from(i))))
                .await
        })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task").expect("publish"))
        .collect();

    assert!(results.iter().all(|r| r.success));
    let mut versions: Vec<u32> = results.iter().filter_map(|r| r.version).collect();
    versions.sort_unstable();
    assert_eq!(versions, (1..=PUBLISHERS).collect::<Vec<_>>());
    assert_eq!(store.len(), PUBLISHERS as usize);
    assert_eq!(publisher.verify(H).await.unwrap(), PUBLISHERS as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tight_budget_never_duplicates_versions() {
    let store = Arc::new(MemorySnapshotStore::new());
    let publisher = Arc::new(publisher(store.clone(), 1));

    let handles = (0..6).map(|i| {
        let publisher = publisher.clone();
        tokio::spawn(async move {
            publisher
                .publish(&PublishRequest::new(H, UserId(i)))
                .await
        })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task").expect("publish"))
        .collect();

    let mut versions: Vec<u32> = results.iter().filter_map(|r| r.version).collect();
    for failed in results.iter().filter(|r| !r.success) {
        assert_eq!(failed.code, PublishCode::PublishConflict);
    }
    versions.sort_unstable();
    assert!(!versions.is_empty());
    assert_eq!(versions, (1..=versions.len() as u32).collect::<Vec<_>>());
    assert_eq!(store.len(), versions.len());
}
