//! Snapshot publication.
//!
//! `publish` turns the current preview into an immutable, versioned snapshot.
//! Version allocation is optimistic: read the highest stored version, insert
//! at `max + 1`, and on a uniqueness conflict re-read and retry within the
//! configured attempt budget. The store's `(hackathon_id, version)` constraint
//! is the only synchronisation between concurrent publishers.

use std::sync::Arc;

use chrono::Utc;
use podium_state::{HackathonId, SnapshotRecord, SnapshotStore, StorageError};
use tracing::{debug, instrument};

use crate::config::PublisherConfig;
use crate::domain::error::{PodiumError, Result};
use crate::domain::{
    Preview, PublishCode, PublishRequest, PublishResult, RankingSnapshot, SnapshotPayload,
};
use crate::metrics::METRICS;
use crate::obs;
use crate::preview::PreviewBuilder;

/// Decide whether a preview may be published for `request`.
///
/// Returns the override reason to store (`None` when votes are complete),
/// or the refusal code.
pub fn completeness_gate(
    preview: &Preview,
    request: &PublishRequest,
) -> std::result::Result<Option<String>, PublishCode> {
    if !preview.missing_votes {
        return Ok(None);
    }
    if !request.override_missing_votes {
        return Err(PublishCode::MissingVotes);
    }
    match request.trimmed_reason() {
        Some(reason) => Ok(Some(reason.to_string())),
        None => Err(PublishCode::OverrideReasonRequired),
    }
}

/// Publishes ranking snapshots and reads them back.
pub struct SnapshotPublisher {
    previews: PreviewBuilder,
    store: Arc<dyn SnapshotStore>,
    config: PublisherConfig,
}

impl SnapshotPublisher {
    pub fn new(
        previews: PreviewBuilder,
        store: Arc<dyn SnapshotStore>,
        config: PublisherConfig,
    ) -> Self {
        Self {
            previews,
            store,
            config,
        }
    }

    pub fn previews(&self) -> &PreviewBuilder {
        &self.previews
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Publish the current ranking of `request.hackathon_id`.
    ///
    /// Gate refusals, lost version races and store failures come back as
    /// `Ok` with a failure code. `Err` means the payload itself could not be
    /// built.
    #[instrument(skip(self, request), fields(hackathon_id = %request.hackathon_id, publisher_id = %request.publisher_id))]
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishResult> {
        let hackathon_id = request.hackathon_id;

        let preview = match self.previews.preview(hackathon_id, false).await {
            Ok(preview) => preview,
            Err(PodiumError::Storage(e)) => return Ok(store_failure(hackathon_id, e)),
            Err(e) => return Err(e),
        };

        let override_reason = match completeness_gate(&preview, request) {
            Ok(reason) => reason,
            Err(code) => {
                obs::emit_publish_refused(hackathon_id, code);
                METRICS.inc_refusals();
                return Ok(PublishResult::failed(code));
            }
        };
        let overridden = override_reason.is_some();

        for attempt in 1..=self.config.max_attempts() {
            let version = match self.store.max_version(hackathon_id).await {
                Ok(current) => current.map_or(1, |v| v.saturating_add(1)),
                Err(e) => return Ok(store_failure(hackathon_id, e)),
            };
            debug!(attempt, version, "inserting snapshot");

            let payload = SnapshotPayload::from_preview(
                version,
                &preview,
                request.publisher_id,
                override_reason.clone(),
                Utc::now(),
            );
            let record = SnapshotRecord::new(hackathon_id, version, payload.to_json()?)?;

            match self.store.insert(record).await {
                Ok(stored) => {
                    obs::emit_snapshot_published(hackathon_id, stored.version, overridden);
                    METRICS.inc_published();
                    return Ok(PublishResult::published(stored.version, overridden));
                }
                Err(e) if e.is_version_conflict() => {
                    obs::emit_version_conflict(hackathon_id, version, attempt);
                    METRICS.inc_conflicts();
                }
                Err(e) => return Ok(store_failure(hackathon_id, e)),
            }
        }

        Ok(PublishResult::failed(PublishCode::PublishConflict))
    }

    /// The highest published version, if any.
    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn latest(&self, hackathon_id: HackathonId) -> Result<Option<RankingSnapshot>> {
        self.store
            .latest(hackathon_id)
            .await?
            .map(RankingSnapshot::try_from)
            .transpose()
    }

    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn snapshot(
        &self,
        hackathon_id: HackathonId,
        version: u32,
    ) -> Result<Option<RankingSnapshot>> {
        self.store
            .get(hackathon_id, version)
            .await?
            .map(RankingSnapshot::try_from)
            .transpose()
    }

    /// Every published snapshot, newest first.
    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn history(&self, hackathon_id: HackathonId) -> Result<Vec<RankingSnapshot>> {
        self.store
            .history(hackathon_id)
            .await?
            .into_iter()
            .map(RankingSnapshot::try_from)
            .collect()
    }

    /// Re-check every stored snapshot of a hackathon.
    ///
    /// Fails on the first payload whose digest no longer matches, on
    /// versions that are not strictly increasing from 1, or on a payload
    /// whose embedded version disagrees with its row. Gaps between versions
    /// are allowed. Returns the number of snapshots checked.
    pub async fn verify(&self, hackathon_id: HackathonId) -> Result<usize> {
        let history = self.history(hackathon_id).await?;
        let mut newer: Option<u32> = None;
        for snapshot in &history {
            let version = snapshot.version;
            if version == 0 || newer.is_some_and(|n| version >= n) {
                return Err(inconsistent_history(
                    hackathon_id,
                    version,
                    "versions are not strictly increasing from 1",
                ));
            }
            if snapshot.payload.version != version {
                return Err(inconsistent_history(
                    hackathon_id,
                    version,
                    &format!("payload records v{}", snapshot.payload.version),
                ));
            }
            newer = Some(version);
        }
        Ok(history.len())
    }
}

fn inconsistent_history(hackathon_id: HackathonId, version: u32, detail: &str) -> PodiumError {
    PodiumError::InconsistentHistory {
        hackathon_id: hackathon_id.0,
        version,
        detail: detail.to_string(),
    }
}

fn store_failure(hackathon_id: HackathonId, error: StorageError) -> PublishResult {
    obs::emit_store_error(hackathon_id, &error);
    PublishResult::store_error(error.to_string())
}
