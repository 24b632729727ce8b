//! Published snapshot payload and its typed, digest-checked view.

use chrono::{DateTime, Utc};
use podium_state::{ContentDigest, HackathonId, SnapshotRecord, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{PodiumError, Result};
use crate::domain::ranking::{Preview, RankingEntry};

/// The document stored in a ranking snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub version: u32,
    pub hackathon_id: HackathonId,
    pub published_at: DateTime<Utc>,
    pub publisher_id: UserId,
    pub overridden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
    pub entries: Vec<RankingEntry>,
}

impl SnapshotPayload {
    /// Build the payload for `version` from a preview. Dispersion detail is
    /// never published.
    pub fn from_preview(
        version: u32,
        preview: &Preview,
        publisher_id: UserId,
        override_reason: Option<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        let entries = preview
            .entries
            .iter()
            .map(|e| RankingEntry {
                dispersion: None,
                ..e.clone()
            })
            .collect();
        Self {
            version,
            hackathon_id: preview.hackathon_id,
            published_at,
            publisher_id,
            overridden: override_reason.is_some(),
            override_reason,
            entries,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A stored snapshot with its payload decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingSnapshot {
    pub snapshot_id: Uuid,
    pub hackathon_id: HackathonId,
    pub version: u32,
    pub payload: SnapshotPayload,
    pub payload_digest: ContentDigest,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SnapshotRecord> for RankingSnapshot {
    type Error = PodiumError;

    /// Decode a stored record, refusing it if the payload no longer matches
    /// the digest taken at insert time.
    fn try_from(record: SnapshotRecord) -> Result<Self> {
        let actual = ContentDigest::of_json(&record.payload)?;
        if actual != record.payload_digest {
            return Err(PodiumError::DigestMismatch {
                hackathon_id: record.hackathon_id.0,
                version: record.version,
                expected: record.payload_digest.to_string(),
                actual: actual.to_string(),
            });
        }
        let payload: SnapshotPayload = serde_json::from_value(record.payload)?;
        Ok(Self {
            snapshot_id: record.snapshot_id,
            hackathon_id: record.hackathon_id,
            version: record.version,
            payload,
            payload_digest: record.payload_digest,
            created_at: record.created_at,
        })
    }
}
