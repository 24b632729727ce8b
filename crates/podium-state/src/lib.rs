//! Podium-State: persistence layer for hackathon rankings
//!
//! This crate owns every byte the ranking core reads or writes. The core only
//! sees the async traits in [`storage_traits`]; this crate provides two
//! implementations of them.
//!
//! ## Key Components
//!
//! - `storage_traits`: record types and the `EvaluationSource`, `TeamSource`,
//!   `JudgeRosterSource`, `SnapshotStore` and `AuditLog` traits
//! - `fakes`: in-memory implementations for tests
//! - `SurrealHandle`: SurrealDB connection, schema and queries
//! - `SurrealRoster` / `SurrealSnapshotStore` / `SurrealAuditLog`: trait adapters
//!
//! Snapshots are append-only; the `(hackathon_id, version)` pair is unique in
//! every backend.

mod error;
pub mod fakes;
mod handle;
mod schema;
pub mod storage_traits;
mod surreal_store;

pub use error::StorageError;
pub use handle::{CloudConfig, SurrealHandle};
pub use storage_traits::{
    AuditLog, AuditRecord, ContentDigest, Evaluation, EvaluationSource, HackathonId,
    JudgeRosterSource, Registration, Role, SnapshotRecord, SnapshotStore, StorageResult, Team,
    TeamId, TeamSource, UserId, MAX_SCORE,
};
pub use surreal_store::{SurrealAuditLog, SurrealRoster, SurrealSnapshotStore};
