use crate::convert::ConversionError;
use connectors::error::CleanupError;
use model::split::descriptor::SplitDescriptor;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tracing::{info, trace, warn};

/// Observability collaborator invoked at lifecycle transition points
/// (open, per-record, close, error). Keeps logging and metrics side
/// effects out of the cursor control flow.
pub trait SourceObserver: Send + Sync {
    fn split_opened(&self, _split: &SplitDescriptor) {}
    fn record_emitted(&self, _split_id: usize) {}
    fn record_skipped(&self, _split_id: usize, _error: &ConversionError) {}
    fn split_exhausted(&self, _split_id: usize) {}
    fn split_closed(&self, _split_id: usize) {}
    fn split_failed(&self, _split_id: usize, _operation: &str, _error: &dyn std::error::Error) {}
    fn cleanup_failed(&self, _split_id: usize, _error: &CleanupError) {}
}

/// Default observer: structured logs through `tracing`.
#[derive(Debug, Default, Clone)]
pub struct TracingObserver;

impl SourceObserver for TracingObserver {
    fn split_opened(&self, split: &SplitDescriptor) {
        info!(split_id = split.id, kind = split.kind(), "split opened");
    }

    fn record_emitted(&self, split_id: usize) {
        trace!(split_id, "record emitted");
    }

    fn record_skipped(&self, split_id: usize, error: &ConversionError) {
        warn!(split_id, error = %error, "record skipped by conversion policy");
    }

    fn split_exhausted(&self, split_id: usize) {
        info!(split_id, "split exhausted");
    }

    fn split_closed(&self, split_id: usize) {
        info!(split_id, "split closed");
    }

    fn split_failed(&self, split_id: usize, operation: &str, error: &dyn std::error::Error) {
        warn!(split_id, operation, error = %error, "split failed");
    }

    fn cleanup_failed(&self, split_id: usize, error: &CleanupError) {
        warn!(split_id, error = %error, "resource release failed during close");
    }
}

#[derive(Debug, Default)]
struct InnerMetrics {
    splits_planned: AtomicU64,
    splits_opened: AtomicU64,
    splits_closed: AtomicU64,
    splits_failed: AtomicU64,
    records_emitted: AtomicU64,
    records_skipped: AtomicU64,
}

/// Shared read metrics. Cloning hands out another handle onto the same
/// counters.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub splits_planned: u64,
    pub splits_opened: u64,
    pub splits_closed: u64,
    pub splits_failed: u64,
    pub records_emitted: u64,
    pub records_skipped: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_splits_planned(&self, count: u64) {
        self.inner.splits_planned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn incr_splits_opened(&self, count: u64) {
        self.inner.splits_opened.fetch_add(count, Ordering::Relaxed);
    }

    pub fn incr_splits_closed(&self, count: u64) {
        self.inner.splits_closed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn incr_splits_failed(&self, count: u64) {
        self.inner.splits_failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn incr_records_emitted(&self, count: u64) {
        self.inner.records_emitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn incr_records_skipped(&self, count: u64) {
        self.inner.records_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            splits_planned: self.inner.splits_planned.load(Ordering::Relaxed),
            splits_opened: self.inner.splits_opened.load(Ordering::Relaxed),
            splits_closed: self.inner.splits_closed.load(Ordering::Relaxed),
            splits_failed: self.inner.splits_failed.load(Ordering::Relaxed),
            records_emitted: self.inner.records_emitted.load(Ordering::Relaxed),
            records_skipped: self.inner.records_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Installs a global `tracing` subscriber honoring `RUST_LOG`. Safe to
/// call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
