//! SurrealDB Handle - Connection and Operations
//!
//! Manages the connection and provides methods for:
//! - teams / registrations / evaluations (seeding and reads)
//! - ranking snapshots (append-only, unique on hackathon + version)
//! - audit entries
//!
//! Supports both local (in-memory) and cloud (WebSocket) connections.

use crate::error::StorageError;
use crate::schema::{DbAuditRecord, DbEvaluation, DbRegistration, DbSnapshot, DbTeam};
use crate::storage_traits::{
    AuditRecord, Evaluation, HackathonId, Registration, SnapshotRecord, StorageResult, Team,
    TeamId,
};
use serde::Deserialize;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

const DEFAULT_NAMESPACE: &str = "podium";
const DEFAULT_DATABASE: &str = "main";

/// Configuration for SurrealDB Cloud connection
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Namespace (default: "podium")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl CloudConfig {
    /// Create a new cloud configuration for a database user
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            is_root: false,
        }
    }

    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SURREALDB_ENDPOINT (required)
    /// - SURREALDB_USERNAME (required)
    /// - SURREALDB_PASSWORD (required)
    /// - SURREALDB_NAMESPACE (optional, default: "podium")
    /// - SURREALDB_DATABASE (optional, default: "main")
    /// - SURREALDB_ROOT (optional, default: "false")
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("SURREALDB_ENDPOINT").map_err(|_| "SURREALDB_ENDPOINT not set")?;
        let username =
            std::env::var("SURREALDB_USERNAME").map_err(|_| "SURREALDB_USERNAME not set")?;
        let password =
            std::env::var("SURREALDB_PASSWORD").map_err(|_| "SURREALDB_PASSWORD not set")?;
        let namespace = std::env::var("SURREALDB_NAMESPACE")
            .unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());
        let database =
            std::env::var("SURREALDB_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        let is_root = std::env::var("SURREALDB_ROOT")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Ok(Self {
            endpoint,
            username,
            password,
            namespace,
            database,
            is_root,
        })
    }
}

#[derive(Debug, Deserialize)]
struct VersionRow {
    version: i64,
}

/// True when SurrealDB rejected a write because of a UNIQUE index or an
/// existing record id.
fn is_unique_violation(err: &surrealdb::Error) -> bool {
    use surrealdb::error::Db;

    match err {
        surrealdb::Error::Db(Db::IndexExists { .. } | Db::RecordExists { .. }) => true,
        // Remote engines only hand back the server's message.
        other => {
            let msg = other.to_string();
            msg.contains("already contains") || msg.contains("already exists")
        }
    }
}

/// SurrealDB connection handle for Podium
#[derive(Clone)]
pub struct SurrealHandle {
    db: Surreal<Any>,
}

impl SurrealHandle {
    /// Connect to SurrealDB in-memory and set up schema
    #[instrument(skip_all)]
    pub async fn setup_db() -> StorageResult<Self> {
        info!("Connecting to SurrealDB (in-memory)");
        Self::connect_url("mem://").await
    }

    /// Connect to any engine URL understood by `surrealdb::engine::any`
    /// (`mem://`, `surrealkv://path`, `ws://host:port`, ...).
    #[instrument(skip_all, fields(url = %url))]
    pub async fn connect_url(url: &str) -> StorageResult<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        db.use_ns(DEFAULT_NAMESPACE)
            .use_db(DEFAULT_DATABASE)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let handle = SurrealHandle { db };
        handle.init_schema().await?;

        info!("SurrealDB connected and schema initialized");
        Ok(handle)
    }

    /// Connect to SurrealDB Cloud
    #[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace, database = %config.database))]
    pub async fn setup_cloud(config: CloudConfig) -> StorageResult<Self> {
        info!("Connecting to SurrealDB Cloud (root={})", config.is_root);

        let db = surrealdb::engine::any::connect(&config.endpoint)
            .await
            .map_err(|e| {
                StorageError::Connection(format!(
                    "Failed to connect to {}: {}",
                    config.endpoint, e
                ))
            })?;

        if config.is_root {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StorageError::Connection(format!("Root authentication failed: {}", e)))?;
        } else {
            db.signin(Database {
                namespace: &config.namespace,
                database: &config.database,
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| {
                StorageError::Connection(format!("Database authentication failed: {}", e))
            })?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StorageError::Connection(format!("Failed to select namespace/database: {}", e))
            })?;

        let handle = SurrealHandle { db };
        handle.init_schema().await?;

        info!("SurrealDB Cloud connected and schema initialized");
        Ok(handle)
    }

    /// Connect using environment variables
    ///
    /// If SURREALDB_ENDPOINT is set, connects to cloud.
    /// If SURREALDB_URL is set, connects to that URL.
    /// Otherwise, falls back to in-memory.
    #[instrument(skip_all)]
    pub async fn setup_from_env() -> StorageResult<Self> {
        if let Ok(config) = CloudConfig::from_env() {
            info!("Cloud config found, connecting to SurrealDB Cloud");
            return Self::setup_cloud(config).await;
        }

        if let Ok(url) = std::env::var("SURREALDB_URL") {
            info!("SURREALDB_URL found, connecting to {}", url);
            return Self::connect_url(&url).await;
        }

        info!("No cloud config found, using in-memory database");
        Self::setup_db().await
    }

    /// Initialize the database schema
    async fn init_schema(&self) -> StorageResult<()> {
        debug!("Initializing Podium schema");

        let schema = r#"
            -- Teams
            DEFINE TABLE teams SCHEMAFULL;
            DEFINE FIELD team_id ON teams TYPE int;
            DEFINE FIELD hackathon_id ON teams TYPE int;
            DEFINE FIELD name ON teams TYPE string;
            DEFINE FIELD created_at ON teams TYPE datetime;
            DEFINE INDEX idx_team_id ON teams FIELDS team_id UNIQUE;
            DEFINE INDEX idx_team_hackathon ON teams FIELDS hackathon_id;

            -- Role-tagged registrations
            DEFINE TABLE registrations SCHEMAFULL;
            DEFINE FIELD hackathon_id ON registrations TYPE int;
            DEFINE FIELD user_id ON registrations TYPE int;
            DEFINE FIELD role ON registrations TYPE string
                ASSERT $value INSIDE ["judge", "participant", "mentor", "organizer"];
            DEFINE INDEX idx_registration_hackathon ON registrations FIELDS hackathon_id;

            -- Judge evaluations
            DEFINE TABLE evaluations SCHEMAFULL;
            DEFINE FIELD judge_id ON evaluations TYPE int;
            DEFINE FIELD team_id ON evaluations TYPE int;
            DEFINE FIELD hackathon_id ON evaluations TYPE int;
            DEFINE FIELD score ON evaluations TYPE int ASSERT $value >= 0 AND $value <= 10;
            DEFINE FIELD submitted_at ON evaluations TYPE datetime;
            DEFINE INDEX idx_evaluation_hackathon ON evaluations FIELDS hackathon_id;

            -- Ranking snapshots (append-only)
            DEFINE TABLE ranking_snapshots SCHEMAFULL;
            DEFINE FIELD snapshot_id ON ranking_snapshots TYPE string;
            DEFINE FIELD hackathon_id ON ranking_snapshots TYPE int;
            DEFINE FIELD version ON ranking_snapshots TYPE int ASSERT $value >= 1;
            DEFINE FIELD payload ON ranking_snapshots TYPE string;
            DEFINE FIELD payload_digest ON ranking_snapshots TYPE string;
            DEFINE FIELD created_at ON ranking_snapshots TYPE datetime;
            DEFINE INDEX idx_snapshot_version ON ranking_snapshots FIELDS hackathon_id, version UNIQUE;

            -- Audit trail
            DEFINE TABLE audit_log SCHEMAFULL;
            DEFINE FIELD action ON audit_log TYPE string;
            DEFINE FIELD hackathon_id ON audit_log TYPE int;
            DEFINE FIELD actor_id ON audit_log TYPE int;
            DEFINE FIELD version ON audit_log TYPE option<int>;
            DEFINE FIELD overridden ON audit_log TYPE bool;
            DEFINE FIELD override_reason ON audit_log TYPE option<string>;
            DEFINE FIELD outcome ON audit_log TYPE string;
            DEFINE FIELD recorded_at ON audit_log TYPE datetime;
            DEFINE INDEX idx_audit_hackathon ON audit_log FIELDS hackathon_id;
        "#;

        self.db
            .query(schema)
            .await
            .map_err(|e| StorageError::SchemaSetup(e.to_string()))?
            .check()
            .map_err(|e| StorageError::SchemaSetup(e.to_string()))?;

        debug!("Schema initialized successfully");
        Ok(())
    }

    // ========== Hackathon Data ==========

    #[instrument(skip(self, team), fields(team_id = %team.team_id, hackathon_id = %team.hackathon_id))]
    pub async fn save_team(&self, team: &Team) -> StorageResult<()> {
        let _created: Option<DbTeam> = self.db.create("teams").content(DbTeam::from(team)).await?;
        Ok(())
    }

    #[instrument(skip(self, registration), fields(hackathon_id = %registration.hackathon_id))]
    pub async fn save_registration(&self, registration: &Registration) -> StorageResult<()> {
        let _created: Option<DbRegistration> = self
            .db
            .create("registrations")
            .content(DbRegistration::from(registration))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, evaluation), fields(hackathon_id = %evaluation.hackathon_id))]
    pub async fn save_evaluation(&self, evaluation: &Evaluation) -> StorageResult<()> {
        let _created: Option<DbEvaluation> = self
            .db
            .create("evaluations")
            .content(DbEvaluation::from(evaluation))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn teams_for(&self, hackathon_id: HackathonId) -> StorageResult<Vec<Team>> {
        let mut result = self
            .db
            .query("SELECT * FROM teams WHERE hackathon_id = $hid ORDER BY team_id")
            .bind(("hid", hackathon_id.0))
            .await?;
        let rows: Vec<DbTeam> = result.take(0)?;
        Ok(rows.into_iter().map(Team::from).collect())
    }

    #[instrument(skip(self), fields(team_id = %team_id))]
    pub async fn team_by_id(&self, team_id: TeamId) -> StorageResult<Option<Team>> {
        let mut result = self
            .db
            .query("SELECT * FROM teams WHERE team_id = $tid LIMIT 1")
            .bind(("tid", team_id.0))
            .await?;
        let rows: Vec<DbTeam> = result.take(0)?;
        Ok(rows.into_iter().next().map(Team::from))
    }

    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn registrations_for(
        &self,
        hackathon_id: HackathonId,
    ) -> StorageResult<Vec<Registration>> {
        let mut result = self
            .db
            .query("SELECT * FROM registrations WHERE hackathon_id = $hid")
            .bind(("hid", hackathon_id.0))
            .await?;
        let rows: Vec<DbRegistration> = result.take(0)?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }

    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn evaluations_for(
        &self,
        hackathon_id: HackathonId,
    ) -> StorageResult<Vec<Evaluation>> {
        let mut result = self
            .db
            .query("SELECT * FROM evaluations WHERE hackathon_id = $hid")
            .bind(("hid", hackathon_id.0))
            .await?;
        let rows: Vec<DbEvaluation> = result.take(0)?;
        rows.into_iter().map(Evaluation::try_from).collect()
    }

    // ========== Ranking Snapshots ==========

    /// Insert a snapshot; a duplicate `(hackathon_id, version)` is a
    /// `StorageError::VersionConflict`.
    #[instrument(skip(self, record), fields(hackathon_id = %record.hackathon_id, version = record.version))]
    pub async fn snapshot_insert(&self, record: &SnapshotRecord) -> StorageResult<SnapshotRecord> {
        let row = DbSnapshot::try_from(record)?;

        let created: Option<DbSnapshot> = self
            .db
            .create("ranking_snapshots")
            .content(row)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StorageError::VersionConflict {
                        hackathon_id: record.hackathon_id.0,
                        version: record.version,
                    }
                } else {
                    StorageError::Backend(e.to_string())
                }
            })?;

        let created = created
            .ok_or_else(|| StorageError::Backend("failed to create snapshot record".to_string()))?;
        info!(
            "Snapshot stored: hackathon {} v{} ({})",
            record.hackathon_id,
            record.version,
            record.payload_digest.short()
        );
        SnapshotRecord::try_from(created)
    }

    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn snapshot_max_version(
        &self,
        hackathon_id: HackathonId,
    ) -> StorageResult<Option<u32>> {
        let mut result = self
            .db
            .query(
                "SELECT version FROM ranking_snapshots WHERE hackathon_id = $hid \
                 ORDER BY version DESC LIMIT 1",
            )
            .bind(("hid", hackathon_id.0))
            .await?;
        let rows: Vec<VersionRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|r| {
                u32::try_from(r.version)
                    .map_err(|_| StorageError::Serialization(format!("version {}", r.version)))
            })
            .transpose()
    }

    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn snapshot_latest(
        &self,
        hackathon_id: HackathonId,
    ) -> StorageResult<Option<SnapshotRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM ranking_snapshots WHERE hackathon_id = $hid \
                 ORDER BY version DESC LIMIT 1",
            )
            .bind(("hid", hackathon_id.0))
            .await?;
        let rows: Vec<DbSnapshot> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(SnapshotRecord::try_from)
            .transpose()
    }

    #[instrument(skip(self), fields(hackathon_id = %hackathon_id, version = version))]
    pub async fn snapshot_get(
        &self,
        hackathon_id: HackathonId,
        version: u32,
    ) -> StorageResult<Option<SnapshotRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM ranking_snapshots WHERE hackathon_id = $hid AND version = $version \
                 LIMIT 1",
            )
            .bind(("hid", hackathon_id.0))
            .bind(("version", i64::from(version)))
            .await?;
        let rows: Vec<DbSnapshot> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(SnapshotRecord::try_from)
            .transpose()
    }

    /// All snapshots for a hackathon, newest first.
    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn snapshot_history(
        &self,
        hackathon_id: HackathonId,
    ) -> StorageResult<Vec<SnapshotRecord>> {
        let mut result = self
            .db
            .query("SELECT * FROM ranking_snapshots WHERE hackathon_id = $hid ORDER BY version DESC")
            .bind(("hid", hackathon_id.0))
            .await?;
        let rows: Vec<DbSnapshot> = result.take(0)?;
        rows.into_iter().map(SnapshotRecord::try_from).collect()
    }

    // ========== Audit ==========

    #[instrument(skip(self, entry), fields(hackathon_id = %entry.hackathon_id, action = %entry.action))]
    pub async fn audit_append(&self, entry: &AuditRecord) -> StorageResult<()> {
        let _created: Option<DbAuditRecord> = self
            .db
            .create("audit_log")
            .content(DbAuditRecord::from(entry))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(hackathon_id = %hackathon_id))]
    pub async fn audit_entries(&self, hackathon_id: HackathonId) -> StorageResult<Vec<AuditRecord>> {
        let mut result = self
            .db
            .query("SELECT * FROM audit_log WHERE hackathon_id = $hid ORDER BY recorded_at ASC")
            .bind(("hid", hackathon_id.0))
            .await?;
        let rows: Vec<DbAuditRecord> = result.take(0)?;
        Ok(rows.into_iter().map(AuditRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_traits::UserId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_remote_unique_violation_message_is_recognised() {
        let err = surrealdb::Error::Api(surrealdb::error::Api::Query(
            "Database index `idx_snapshot_version` already contains [1, 2]".to_string(),
        ));
        assert!(is_unique_violation(&err));

        let err = surrealdb::Error::Api(surrealdb::error::Api::Query(
            "connection reset by peer".to_string(),
        ));
        assert!(!is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_surreal_connection_and_schema_creation() {
        let handle = SurrealHandle::setup_db().await;
        assert!(handle.is_ok(), "Failed to connect: {:?}", handle.err());
    }

    #[tokio::test]
    async fn test_team_round_trip() {
        let handle = SurrealHandle::setup_db().await.unwrap();
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let team = Team {
            team_id: TeamId(11),
            hackathon_id: HackathonId(1),
            name: "Rustaceans".to_string(),
            created_at,
        };
        handle.save_team(&team).await.unwrap();

        let teams = handle.teams_for(HackathonId(1)).await.unwrap();
        assert_eq!(teams, vec![team.clone()]);
        assert_eq!(handle.team_by_id(TeamId(11)).await.unwrap(), Some(team));
        assert!(handle.teams_for(HackathonId(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_registrations_keep_role_tags() {
        let handle = SurrealHandle::setup_db().await.unwrap();
        handle
            .save_registration(&Registration::judge(HackathonId(1), UserId(5)))
            .await
            .unwrap();
        handle
            .save_registration(&Registration {
                hackathon_id: HackathonId(1),
                user_id: UserId(6),
                role: crate::storage_traits::Role::Organizer,
            })
            .await
            .unwrap();

        let regs = handle.registrations_for(HackathonId(1)).await.unwrap();
        assert_eq!(regs.len(), 2);
        assert_eq!(regs.iter().filter(|r| r.is_judge()).count(), 1);
    }
}
