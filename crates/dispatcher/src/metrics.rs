//! Bus metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by a `Bus`
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Publish calls that passed the verbosity filter
    published: AtomicU64,
    /// Publish calls dropped by the verbosity filter
    filtered: AtomicU64,
    /// Individual callback invocations
    delivered: AtomicU64,
}

impl BusMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn inc_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    pub fn inc_filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn add_delivered(&self, count: u64) {
        self.delivered.fetch_add(count, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            published: self.published(),
            filtered: self.filtered(),
            delivered: self.delivered(),
        }
    }
}

/// Snapshot of bus metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub published: u64,
    pub filtered: u64,
    pub delivered: u64,
}
