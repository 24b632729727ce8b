//! Global atomic counters for ranking and publication.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before a CLI command exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, no allocations, no locking.
pub struct Metrics {
    previews_built: AtomicU64,
    snapshots_published: AtomicU64,
    publish_refusals: AtomicU64,
    version_conflicts: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            previews_built: AtomicU64::new(0),
            snapshots_published: AtomicU64::new(0),
            publish_refusals: AtomicU64::new(0),
            version_conflicts: AtomicU64::new(0),
        }
    }

    pub fn inc_previews(&self) {
        self.previews_built.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "previews_built", "counter incremented");
    }

    pub fn inc_published(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "snapshots_published", "counter incremented");
    }

    pub fn inc_refusals(&self) {
        self.publish_refusals.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "publish_refusals", "counter incremented");
    }

    pub fn inc_conflicts(&self) {
        self.version_conflicts.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "version_conflicts", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            previews_built = self.previews_built(),
            snapshots_published = self.snapshots_published(),
            publish_refusals = self.publish_refusals(),
            version_conflicts = self.version_conflicts(),
        );
    }

    pub fn previews_built(&self) -> u64 {
        self.previews_built.load(Ordering::Relaxed)
    }

    pub fn snapshots_published(&self) -> u64 {
        self.snapshots_published.load(Ordering::Relaxed)
    }

    pub fn publish_refusals(&self) -> u64 {
        self.publish_refusals.load(Ordering::Relaxed)
    }

    pub fn version_conflicts(&self) -> u64 {
        self.version_conflicts.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.previews_built.store(0, Ordering::Relaxed);
        self.snapshots_published.store(0, Ordering::Relaxed);
        self.publish_refusals.store(0, Ordering::Relaxed);
        self.version_conflicts.store(0, Ordering::Relaxed);
    }
}
