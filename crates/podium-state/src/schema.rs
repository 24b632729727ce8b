//! Row types for the Podium SurrealDB tables
//!
//! Tables:
//! - teams: Teams per hackathon
//! - registrations: Role-tagged hackathon registrations
//! - evaluations: Judge scores
//! - ranking_snapshots: Published rankings, unique on (hackathon_id, version)
//! - audit_log: Publish decisions handed to the audit collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage_traits::{
    AuditRecord, ContentDigest, Evaluation, HackathonId, Registration, Role, SnapshotRecord,
    StorageResult, Team, TeamId, UserId,
};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DbTeam {
    pub team_id: i64,
    pub hackathon_id: i64,
    pub name: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<&Team> for DbTeam {
    fn from(team: &Team) -> Self {
        Self {
            team_id: team.team_id.0,
            hackathon_id: team.hackathon_id.0,
            name: team.name.clone(),
            created_at: team.created_at,
        }
    }
}

impl From<DbTeam> for Team {
    fn from(row: DbTeam) -> Self {
        Team {
            team_id: TeamId(row.team_id),
            hackathon_id: HackathonId(row.hackathon_id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DbRegistration {
    pub hackathon_id: i64,
    pub user_id: i64,
    pub role: Role,
}

impl From<&Registration> for DbRegistration {
    fn from(reg: &Registration) -> Self {
        Self {
            hackathon_id: reg.hackathon_id.0,
            user_id: reg.user_id.0,
            role: reg.role,
        }
    }
}

impl From<DbRegistration> for Registration {
    fn from(row: DbRegistration) -> Self {
        Registration {
            hackathon_id: HackathonId(row.hackathon_id),
            user_id: UserId(row.user_id),
            role: row.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DbEvaluation {
    pub judge_id: i64,
    pub team_id: i64,
    pub hackathon_id: i64,
    pub score: i64,
    #[serde(with = "surreal_datetime")]
    pub submitted_at: DateTime<Utc>,
}

impl From<&Evaluation> for DbEvaluation {
    fn from(e: &Evaluation) -> Self {
        Self {
            judge_id: e.judge_id.0,
            team_id: e.team_id.0,
            hackathon_id: e.hackathon_id.0,
            score: i64::from(e.score),
            submitted_at: e.submitted_at,
        }
    }
}

impl TryFrom<DbEvaluation> for Evaluation {
    type Error = StorageError;

    fn try_from(row: DbEvaluation) -> StorageResult<Self> {
        Evaluation::new(
            UserId(row.judge_id),
            TeamId(row.team_id),
            HackathonId(row.hackathon_id),
            row.score,
            row.submitted_at,
        )
    }
}

/// Snapshot row. The payload is kept as its JSON text so the bytes that were
/// digested are the bytes that come back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DbSnapshot {
    pub snapshot_id: String,
    pub hackathon_id: i64,
    pub version: i64,
    pub payload: String,
    pub payload_digest: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&SnapshotRecord> for DbSnapshot {
    type Error = StorageError;

    fn try_from(record: &SnapshotRecord) -> StorageResult<Self> {
        Ok(Self {
            snapshot_id: record.snapshot_id.to_string(),
            hackathon_id: record.hackathon_id.0,
            version: i64::from(record.version),
            payload: serde_json::to_string(&record.payload)?,
            payload_digest: record.payload_digest.as_str().to_string(),
            created_at: record.created_at,
        })
    }
}

impl TryFrom<DbSnapshot> for SnapshotRecord {
    type Error = StorageError;

    fn try_from(row: DbSnapshot) -> StorageResult<Self> {
        let snapshot_id = Uuid::parse_str(&row.snapshot_id)
            .map_err(|e| StorageError::Serialization(format!("snapshot_id: {}", e)))?;
        let version = u32::try_from(row.version)
            .map_err(|_| StorageError::Serialization(format!("version {}", row.version)))?;
        Ok(SnapshotRecord {
            snapshot_id,
            hackathon_id: HackathonId(row.hackathon_id),
            version,
            payload: serde_json::from_str(&row.payload)?,
            payload_digest: ContentDigest::try_from(row.payload_digest)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DbAuditRecord {
    pub action: String,
    pub hackathon_id: i64,
    pub actor_id: i64,
    pub version: Option<i64>,
    pub overridden: bool,
    pub override_reason: Option<String>,
    pub outcome: String,
    #[serde(with = "surreal_datetime")]
    pub recorded_at: DateTime<Utc>,
}

impl From<&AuditRecord> for DbAuditRecord {
    fn from(entry: &AuditRecord) -> Self {
        Self {
            action: entry.action.clone(),
            hackathon_id: entry.hackathon_id.0,
            actor_id: entry.actor_id.0,
            version: entry.version.map(i64::from),
            overridden: entry.overridden,
            override_reason: entry.override_reason.clone(),
            outcome: entry.outcome.clone(),
            recorded_at: entry.recorded_at,
        }
    }
}

impl From<DbAuditRecord> for AuditRecord {
    fn from(row: DbAuditRecord) -> Self {
        AuditRecord {
            action: row.action,
            hackathon_id: HackathonId(row.hackathon_id),
            actor_id: UserId(row.actor_id),
            version: row.version.and_then(|v| u32::try_from(v).ok()),
            overridden: row.overridden,
            override_reason: row.override_reason,
            outcome: row.outcome,
            recorded_at: row.recorded_at,
        }
    }
}
