use std::sync::Arc;

use async_trait::async_trait;

use crate::storage_traits::{
    AuditLog, AuditRecord, Evaluation, EvaluationSource, HackathonId, JudgeRosterSource,
    Registration, SnapshotRecord, SnapshotStore, StorageResult, Team, TeamId, TeamSource,
};
use crate::SurrealHandle;

/// SurrealDB-backed hackathon data: evaluations, teams and registrations.
#[derive(Clone)]
pub struct SurrealRoster {
    handle: Arc<SurrealHandle>,
}

impl SurrealRoster {
    pub fn new(handle: Arc<SurrealHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl EvaluationSource for SurrealRoster {
    async fn evaluations(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Evaluation>> {
        self.handle.evaluations_for(hackathon_id).await
    }
}

#[async_trait]
impl TeamSource for SurrealRoster {
    async fn teams(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Team>> {
        self.handle.teams_for(hackathon_id).await
    }

    async fn team(&self, team_id: TeamId) -> StorageResult<Option<Team>> {
        self.handle.team_by_id(team_id).await
    }
}

#[async_trait]
impl JudgeRosterSource for SurrealRoster {
    async fn registrations(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Registration>> {
        self.handle.registrations_for(hackathon_id).await
    }
}

/// SurrealDB-backed implementation of the SnapshotStore trait.
#[derive(Clone)]
pub struct SurrealSnapshotStore {
    handle: Arc<SurrealHandle>,
}

impl SurrealSnapshotStore {
    pub fn new(handle: Arc<SurrealHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl SnapshotStore for SurrealSnapshotStore {
    async fn max_version(&self, hackathon_id: HackathonId) -> StorageResult<Option<u32>> {
        self.handle.snapshot_max_version(hackathon_id).await
    }

    async fn latest(&self, hackathon_id: HackathonId) -> StorageResult<Option<SnapshotRecord>> {
        self.handle.snapshot_latest(hackathon_id).await
    }

    async fn get(
        &self,
        hackathon_id: HackathonId,
        version: u32,
    ) -> StorageResult<Option<SnapshotRecord>> {
        self.handle.snapshot_get(hackathon_id, version).await
    }

    async fn history(&self, hackathon_id: HackathonId) -> StorageResult<Vec<SnapshotRecord>> {
        self.handle.snapshot_history(hackathon_id).await
    }

    async fn insert(&self, record: SnapshotRecord) -> StorageResult<SnapshotRecord> {
        self.handle.snapshot_insert(&record).await
    }
}

/// SurrealDB-backed audit trail.
#[derive(Clone)]
pub struct SurrealAuditLog {
    handle: Arc<SurrealHandle>,
}

impl SurrealAuditLog {
    pub fn new(handle: Arc<SurrealHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl AuditLog for SurrealAuditLog {
    async fn record(&self, entry: AuditRecord) -> StorageResult<()> {
        self.handle.audit_append(&entry).await
    }

    async fn entries(&self, hackathon_id: HackathonId) -> StorageResult<Vec<AuditRecord>> {
        self.handle.audit_entries(hackathon_id).await
    }
}
