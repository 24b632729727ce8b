//! Structured observability hooks for ranking and publication events.
//!
//! This module provides:
//! - Hackathon-scoped tracing spans via the `HackathonSpan` RAII guard
//! - Emission functions for preview, refusal, conflict and publication events
//!
//! Events are emitted at `info!` level, failures at `warn!`. Filtering follows
//! `RUST_LOG`; see [`crate::telemetry::init_tracing`].

use podium_state::HackathonId;
use tracing::{info, warn};

use crate::domain::PublishCode;

/// RAII guard that enters a hackathon-scoped span for its lifetime.
///
/// # Example
///
/// ```ignore
/// let _span = HackathonSpan::enter(HackathonId(7));
/// // every event below carries hackathon_id = 7
/// ```
pub struct HackathonSpan {
    _span: tracing::span::EnteredSpan,
}

impl HackathonSpan {
    pub fn enter(hackathon_id: HackathonId) -> Self {
        let span = tracing::info_span!("podium.hackathon", hackathon_id = %hackathon_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a preview was computed.
pub fn emit_preview_built(hackathon_id: HackathonId, teams: usize, missing_votes: bool) {
    info!(
        event = "preview.built",
        hackathon_id = %hackathon_id,
        teams = teams,
        missing_votes = missing_votes,
    );
}

/// Emit event: publish refused by the completeness gate.
pub fn emit_publish_refused(hackathon_id: HackathonId, code: PublishCode) {
    info!(event = "publish.refused", hackathon_id = %hackathon_id, code = %code);
}

/// Emit event: a concurrent publisher took `version` first.
pub fn emit_version_conflict(hackathon_id: HackathonId, version: u32, attempt: u32) {
    warn!(
        event = "publish.version_conflict",
        hackathon_id = %hackathon_id,
        version = version,
        attempt = attempt,
    );
}

/// Emit event: a snapshot was written.
pub fn emit_snapshot_published(hackathon_id: HackathonId, version: u32, overridden: bool) {
    info!(
        event = "snapshot.published",
        hackathon_id = %hackathon_id,
        version = version,
        overridden = overridden,
    );
}

/// Emit event: a store collaborator failed during publish (warning level).
pub fn emit_store_error(hackathon_id: HackathonId, error: &dyn std::fmt::Display) {
    warn!(event = "publish.store_error", hackathon_id = %hackathon_id, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hackathon_span_create() {
        let _span = HackathonSpan::enter(HackathonId(1));
    }
}
