//! Podium Core Library
//!
//! Hackathon ranking and versioned snapshot publication.
//!
//! - `aggregate`, `completeness`, `tiebreak`: pure ranking computations
//! - `PreviewBuilder`: read-only ranking over the storage traits
//! - `SnapshotPublisher`: completeness gate plus optimistic version allocation
//! - `audit`: which publish outcomes the audit trail records

pub mod aggregate;
pub mod audit;
pub mod completeness;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod obs;
pub mod preview;
pub mod publisher;
pub mod telemetry;
pub mod tiebreak;

pub use aggregate::{aggregate_scores, TeamScores};
pub use audit::audit_record_for;
pub use completeness::{check_completeness, has_missing_votes, CompletenessReport};
pub use config::{PublisherConfig, DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_ENV};
pub use domain::{
    PodiumError, Preview, PublishCode, PublishRequest, PublishResult, RankingEntry,
    RankingSnapshot, Result, SnapshotPayload, TeamAggregate,
};
pub use preview::PreviewBuilder;
pub use publisher::{completeness_gate, SnapshotPublisher};
pub use tiebreak::{compare_aggregates, order_aggregates, resolve_ranking};

pub use podium_state::{HackathonId, TeamId, UserId};

pub use metrics::METRICS;
pub use obs::{
    emit_preview_built, emit_publish_refused, emit_snapshot_published, emit_store_error,
    emit_version_conflict, HackathonSpan,
};
pub use telemetry::init_tracing;

/// Podium version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
