//! Storage trait definitions for Podium
//!
//! The ranking core only touches persistence through these traits:
//! - `EvaluationSource`, `TeamSource`, `JudgeRosterSource`: read-only hackathon data
//! - `SnapshotStore`: append-only, versioned ranking snapshots
//! - `AuditLog`: the audit collaborator for publish decisions
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Hackathon (event) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HackathonId(pub i64);

/// Team identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

/// User identifier. Judges and publishers are both users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for HackathonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Hackathon data (read-only to the ranking core)
// ---------------------------------------------------------------------------

/// A team registered for a hackathon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub hackathon_id: HackathonId,
    pub name: String,
    /// Registration time; used as the third ranking tie-break.
    pub created_at: DateTime<Utc>,
}

/// Role tag carried by a hackathon registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Judge,
    Participant,
    Mentor,
    Organizer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Judge => "judge",
            Role::Participant => "participant",
            Role::Mentor => "mentor",
            Role::Organizer => "organizer",
        }
    }
}

/// A user's registration for a hackathon under a given role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub hackathon_id: HackathonId,
    pub user_id: UserId,
    pub role: Role,
}

impl Registration {
    pub fn judge(hackathon_id: HackathonId, user_id: UserId) -> Self {
        Self {
            hackathon_id,
            user_id,
            role: Role::Judge,
        }
    }

    pub fn is_judge(&self) -> bool {
        self.role == Role::Judge
    }
}

/// Highest score a judge may award.
pub const MAX_SCORE: u8 = 10;

/// One judge's score for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub judge_id: UserId,
    pub team_id: TeamId,
    pub hackathon_id: HackathonId,
    pub score: u8,
    pub submitted_at: DateTime<Utc>,
}

impl Evaluation {
    /// Build an evaluation, rejecting scores outside `0..=10`.
    pub fn new(
        judge_id: UserId,
        team_id: TeamId,
        hackathon_id: HackathonId,
        score: i64,
        submitted_at: DateTime<Utc>,
    ) -> StorageResult<Self> {
        if !(0..=i64::from(MAX_SCORE)).contains(&score) {
            return Err(StorageError::InvalidScore { score });
        }
        Ok(Self {
            judge_id,
            team_id,
            hackathon_id,
            score: score as u8,
            submitted_at,
        })
    }

    /// Whether the score is within range. Records built outside `new`
    /// (e.g. decoded from a backend) may not be.
    pub fn has_valid_score(&self) -> bool {
        self.score <= MAX_SCORE
    }
}

/// Source of evaluations.
#[async_trait]
pub trait EvaluationSource: Send + Sync {
    /// All evaluations recorded for a hackathon.
    async fn evaluations(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Evaluation>>;
}

/// Source of teams.
#[async_trait]
pub trait TeamSource: Send + Sync {
    /// All teams registered for a hackathon.
    async fn teams(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Team>>;

    /// A single team by id, regardless of hackathon.
    async fn team(&self, team_id: TeamId) -> StorageResult<Option<Team>>;
}

/// Source of hackathon registrations (all roles).
#[async_trait]
pub trait JudgeRosterSource: Send + Sync {
    /// All registrations for a hackathon. Callers filter on [`Role::Judge`].
    async fn registrations(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Registration>>;
}

// ---------------------------------------------------------------------------
// SnapshotStore: append-only versioned ranking snapshots
// ---------------------------------------------------------------------------

/// Content digest (SHA-256 hex string) of a snapshot payload.
///
/// The inner field is private to guarantee the string is always valid
/// lowercase hex produced by `from_bytes` or validated via `TryFrom<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex::encode(hasher.finalize()))
    }

    /// Digest of the canonical JSON encoding of `value`.
    ///
    /// Object keys are sorted at every level, even if `preserve_order` is
    /// enabled somewhere in the dependency graph.
    pub fn of_json(value: &serde_json::Value) -> StorageResult<Self> {
        let bytes = serde_json::to_vec(&canonical_json(value))?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

fn canonical_json(value: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonical_json(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_json).collect()),
        other => other.clone(),
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::Serialization(format!(
                "invalid payload digest: {}",
                s
            )));
        }
        Ok(ContentDigest(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted ranking snapshot. Never updated or deleted once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub snapshot_id: Uuid,
    pub hackathon_id: HackathonId,
    /// 1-based, strictly increasing per hackathon.
    pub version: u32,
    /// Structured payload document (ordered entries plus publication metadata).
    pub payload: serde_json::Value,
    /// Digest of `payload` taken when the record was built.
    pub payload_digest: ContentDigest,
    pub created_at: DateTime<Utc>,
}

impl SnapshotRecord {
    /// Build a record for insertion, digesting the payload.
    pub fn new(
        hackathon_id: HackathonId,
        version: u32,
        payload: serde_json::Value,
    ) -> StorageResult<Self> {
        let payload_digest = ContentDigest::of_json(&payload)?;
        Ok(Self {
            snapshot_id: Uuid::new_v4(),
            hackathon_id,
            version,
            payload,
            payload_digest,
            created_at: Utc::now(),
        })
    }

    /// Recompute the payload digest and compare with the recorded one.
    pub fn digest_matches(&self) -> StorageResult<bool> {
        Ok(ContentDigest::of_json(&self.payload)? == self.payload_digest)
    }
}

/// Versioned snapshot persistence.
///
/// Guarantees:
/// - `insert` fails with `StorageError::VersionConflict` when a snapshot
///   already exists for the same `(hackathon_id, version)`.
/// - Stored snapshots are never mutated or removed through this trait.
/// - `history` returns snapshots newest first.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Highest stored version for a hackathon, `None` if nothing is published.
    async fn max_version(&self, hackathon_id: HackathonId) -> StorageResult<Option<u32>>;

    /// The snapshot with the highest version, if any.
    async fn latest(&self, hackathon_id: HackathonId) -> StorageResult<Option<SnapshotRecord>>;

    /// A specific version.
    async fn get(
        &self,
        hackathon_id: HackathonId,
        version: u32,
    ) -> StorageResult<Option<SnapshotRecord>>;

    /// Every snapshot for a hackathon, newest first.
    async fn history(&self, hackathon_id: HackathonId) -> StorageResult<Vec<SnapshotRecord>>;

    /// Insert a new snapshot, enforcing `(hackathon_id, version)` uniqueness.
    async fn insert(&self, record: SnapshotRecord) -> StorageResult<SnapshotRecord>;
}

// ---------------------------------------------------------------------------
// AuditLog: external audit collaborator
// ---------------------------------------------------------------------------

/// One audit trail entry describing a publish decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Dotted action name, e.g. `ranking.published`.
    pub action: String,
    pub hackathon_id: HackathonId,
    pub actor_id: UserId,
    /// Snapshot version, when one was written.
    pub version: Option<u32>,
    pub overridden: bool,
    pub override_reason: Option<String>,
    /// Result code of the decision being audited.
    pub outcome: String,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditRecord) -> StorageResult<()>;

    /// All entries for a hackathon, oldest first.
    async fn entries(&self, hackathon_id: HackathonId) -> StorageResult<Vec<AuditRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluation_rejects_out_of_range_scores() {
        let now = Utc::now();
        let ok = Evaluation::new(UserId(1), TeamId(2), HackathonId(3), 10, now);
        assert!(ok.is_ok());

        for bad in [-1, 11, 255] {
            let err = Evaluation::new(UserId(1), TeamId(2), HackathonId(3), bad, now).unwrap_err();
            assert!(matches!(err, StorageError::InvalidScore { score } if score == bad));
        }
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let reg = Registration::judge(HackathonId(4), UserId(9));
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json, json!({"hackathon_id": 4, "user_id": 9, "role": "judge"}));
    }

    #[test]
    fn payload_digest_ignores_key_insertion_order() {
        let a: serde_json::Value = serde_json::from_str(r#"{"version":1,"entries":[]}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"entries":[],"version":1}"#).unwrap();
        assert_eq!(
            ContentDigest::of_json(&a).unwrap(),
            ContentDigest::of_json(&b).unwrap()
        );
    }

    #[test]
    fn snapshot_record_detects_tampered_payload() {
        let mut record =
            SnapshotRecord::new(HackathonId(1), 1, json!({"version": 1, "entries": []})).unwrap();
        assert!(record.digest_matches().unwrap());

        record.payload = json!({"version": 1, "entries": [{"rank": 1}]});
        assert!(!record.digest_matches().unwrap());
    }

    #[test]
    fn content_digest_try_from_validates_hex() {
        assert!(ContentDigest::try_from("zz".to_string()).is_err());
        let hex = "A".repeat(64);
        let digest = ContentDigest::try_from(hex).unwrap();
        assert_eq!(digest.as_str(), "a".repeat(64));
        assert_eq!(digest.short().len(), 12);
    }
}
