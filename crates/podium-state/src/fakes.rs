//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryHackathonData` (evaluations, teams, registrations),
//! `MemorySnapshotStore` and `MemoryAuditLog` that satisfy the trait
//! contracts without any external dependencies.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryHackathonData
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct HackathonTables {
    teams: Vec<Team>,
    registrations: Vec<Registration>,
    evaluations: Vec<Evaluation>,
}

/// In-memory hackathon data implementing all three read-side sources.
///
/// Rows are returned in insertion order.
#[derive(Debug, Default)]
pub struct MemoryHackathonData {
    tables: Mutex<HackathonTables>,
}

impl MemoryHackathonData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_team(&self, team: Team) {
        self.tables.lock().unwrap().teams.push(team);
    }

    pub fn add_registration(&self, registration: Registration) {
        self.tables.lock().unwrap().registrations.push(registration);
    }

    pub fn add_evaluation(&self, evaluation: Evaluation) {
        self.tables.lock().unwrap().evaluations.push(evaluation);
    }
}

#[async_trait]
impl EvaluationSource for MemoryHackathonData {
    async fn evaluations(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Evaluation>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .evaluations
            .iter()
            .filter(|e| e.hackathon_id == hackathon_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TeamSource for MemoryHackathonData {
    async fn teams(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Team>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .teams
            .iter()
            .filter(|t| t.hackathon_id == hackathon_id)
            .cloned()
            .collect())
    }

    async fn team(&self, team_id: TeamId) -> StorageResult<Option<Team>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.teams.iter().find(|t| t.team_id == team_id).cloned())
    }
}

#[async_trait]
impl JudgeRosterSource for MemoryHackathonData {
    async fn registrations(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Registration>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .registrations
            .iter()
            .filter(|r| r.hackathon_id == hackathon_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemorySnapshotStore
// ---------------------------------------------------------------------------

/// In-memory snapshot store backed by a `HashMap<hackathon, Vec<SnapshotRecord>>`.
///
/// Each call takes the lock once, so a caller reading `max_version` and then
/// calling `insert` can lose a race to another task in between, exactly like
/// a real backend with a unique index.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<HackathonId, Vec<SnapshotRecord>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored snapshots across all hackathons.
    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn max_version(&self, hackathon_id: HackathonId) -> StorageResult<Option<u32>> {
        let snapshots = self.snapshots.lock().unwrap();
        Ok(snapshots
            .get(&hackathon_id)
            .and_then(|h| h.iter().map(|s| s.version).max()))
    }

    async fn latest(&self, hackathon_id: HackathonId) -> StorageResult<Option<SnapshotRecord>> {
        let snapshots = self.snapshots.lock().unwrap();
        Ok(snapshots
            .get(&hackathon_id)
            .and_then(|h| h.iter().max_by_key(|s| s.version).cloned()))
    }

    async fn get(
        &self,
        hackathon_id: HackathonId,
        version: u32,
    ) -> StorageResult<Option<SnapshotRecord>> {
        let snapshots = self.snapshots.lock().unwrap();
        Ok(snapshots
            .get(&hackathon_id)
            .and_then(|h| h.iter().find(|s| s.version == version).cloned()))
    }

    async fn history(&self, hackathon_id: HackathonId) -> StorageResult<Vec<SnapshotRecord>> {
        let snapshots = self.snapshots.lock().unwrap();
        let mut history = snapshots.get(&hackathon_id).cloned().unwrap_or_default();
        history.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(history)
    }

    async fn insert(&self, record: SnapshotRecord) -> StorageResult<SnapshotRecord> {
        let mut snapshots = self.snapshots.lock().unwrap();
        let history = snapshots.entry(record.hackathon_id).or_default();
        if history.iter().any(|s| s.version == record.version) {
            return Err(StorageError::VersionConflict {
                hackathon_id: record.hackathon_id.0,
                version: record.version,
            });
        }
        history.push(record.clone());
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// MemoryAuditLog
// ---------------------------------------------------------------------------

/// In-memory audit trail.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(&self, entry: AuditRecord) -> StorageResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    async fn entries(&self, hackathon_id: HackathonId) -> StorageResult<Vec<AuditRecord>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| e.hackathon_id == hackathon_id)
            .cloned()
            .collect())
    }
}
