//! Domain models for Podium.
//!
//! - `TeamAggregate`, `RankingEntry`, `Preview`: ranking values
//! - `SnapshotPayload`, `RankingSnapshot`: published documents
//! - `PublishRequest`, `PublishResult`, `PublishCode`: the publish contract

pub mod error;
pub mod publish;
pub mod ranking;
pub mod snapshot;

pub use error::{PodiumError, Result};
pub use publish::{PublishCode, PublishRequest, PublishResult};
pub use ranking::{Preview, RankingEntry, TeamAggregate};
pub use snapshot::{RankingSnapshot, SnapshotPayload};
