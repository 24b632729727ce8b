use std::sync::Arc;

use chrono::{TimeZone, Utc};
use podium_state::{
    AuditLog, AuditRecord, Evaluation, EvaluationSource, HackathonId, JudgeRosterSource,
    Registration, SnapshotRecord, SnapshotStore, StorageError, SurrealAuditLog, SurrealHandle,
    SurrealRoster, SurrealSnapshotStore, Team, TeamId, TeamSource, UserId,
};
use serde_json::json;

fn payload(version: u32) -> serde_json::Value {
    json!({
        "version": version,
        "hackathonId": 1,
        "publisherId": 9,
        "overridden": false,
        "entries": [
            {"rank": 1, "teamId": 2, "teamName": "beta", "averageScore": 8.0, "votesCount": 2},
            {"rank": 2, "teamId": 1, "teamName": "alpha", "averageScore": 7.5, "votesCount": 2}
        ]
    })
}

#[tokio::test]
async fn surreal_store_insert_latest_and_history() {
    let handle = Arc::new(SurrealHandle::setup_db().await.unwrap());
    let store = SurrealSnapshotStore::new(handle);

    assert_eq!(store.max_version(HackathonId(1)).await.unwrap(), None);

    for v in 1..=2 {
        let record = SnapshotRecord::new(HackathonId(1), v, payload(v)).unwrap();
        store.insert(record).await.unwrap();
    }

    assert_eq!(store.max_version(HackathonId(1)).await.unwrap(), Some(2));

    let latest = store.latest(HackathonId(1)).await.unwrap().unwrap();
    assert_eq!(latest.version, 2);
    assert_eq!(latest.payload, payload(2));
    assert!(latest.digest_matches().unwrap());

    let history = store.history(HackathonId(1)).await.unwrap();
    assert_eq!(
        history.iter().map(|s| s.version).collect::<Vec<_>>(),
        vec![2, 1]
    );

    let v1 = store.get(HackathonId(1), 1).await.unwrap().unwrap();
    assert_eq!(v1.payload, payload(1));
    assert!(store.get(HackathonId(1), 3).await.unwrap().is_none());
}

#[tokio::test]
async fn surreal_store_duplicate_version_is_a_conflict() {
    let handle = Arc::new(SurrealHandle::setup_db().await.unwrap());
    let store = SurrealSnapshotStore::new(handle);

    let first = SnapshotRecord::new(HackathonId(1), 1, payload(1)).unwrap();
    store.insert(first.clone()).await.unwrap();

    let second = SnapshotRecord::new(HackathonId(1), 1, json!({"version": 1, "entries": []}))
        .unwrap();
    let err = store.insert(second).await.unwrap_err();
    assert!(
        matches!(err, StorageError::VersionConflict { version: 1, .. }),
        "expected a version conflict, got {:?}",
        err
    );

    let stored = store.get(HackathonId(1), 1).await.unwrap().unwrap();
    assert_eq!(stored.snapshot_id, first.snapshot_id);
    assert_eq!(stored.payload, payload(1));
}

#[tokio::test]
async fn surreal_store_versions_are_scoped_per_hackathon() {
    let handle = Arc::new(SurrealHandle::setup_db().await.unwrap());
    let store = SurrealSnapshotStore::new(handle);

    store
        .insert(SnapshotRecord::new(HackathonId(1), 1, payload(1)).unwrap())
        .await
        .unwrap();
    store
        .insert(SnapshotRecord::new(HackathonId(2), 1, payload(1)).unwrap())
        .await
        .unwrap();

    assert_eq!(store.max_version(HackathonId(2)).await.unwrap(), Some(1));
}

#[tokio::test]
async fn surreal_roster_reads_seeded_rows() {
    let handle = Arc::new(SurrealHandle::setup_db().await.unwrap());
    let created_at = Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap();
    handle
        .save_team(&Team {
            team_id: TeamId(1),
            hackathon_id: HackathonId(1),
            name: "alpha".to_string(),
            created_at,
        })
        .await
        .unwrap();
    handle
        .save_registration(&Registration::judge(HackathonId(1), UserId(7)))
        .await
        .unwrap();
    handle
        .save_evaluation(
            &Evaluation::new(UserId(7), TeamId(1), HackathonId(1), 8, created_at).unwrap(),
        )
        .await
        .unwrap();

    let roster = SurrealRoster::new(handle);
    assert_eq!(roster.teams(HackathonId(1)).await.unwrap().len(), 1);
    assert_eq!(roster.registrations(HackathonId(1)).await.unwrap().len(), 1);
    let evals = roster.evaluations(HackathonId(1)).await.unwrap();
    assert_eq!(evals.len(), 1);
    assert_eq!(evals[0].score, 8);
    assert_eq!(evals[0].submitted_at, created_at);
}

#[tokio::test]
async fn surreal_audit_log_round_trip() {
    let handle = Arc::new(SurrealHandle::setup_db().await.unwrap());
    let log = SurrealAuditLog::new(handle);

    log.record(AuditRecord {
        action: "ranking.published_with_override".to_string(),
        hackathon_id: HackathonId(3),
        actor_id: UserId(9),
        version: Some(1),
        overridden: true,
        override_reason: Some("urgent deadline".to_string()),
        outcome: "published".to_string(),
        recorded_at: Utc::now(),
    })
    .await
    .unwrap();

    let entries = log.entries(HackathonId(3)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].override_reason.as_deref(), Some("urgent deadline"));
    assert_eq!(entries[0].version, Some(1));
}
