//! Import metrics

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;

/// Import counters, mirrored to the `metrics` facade
#[derive(Debug, Default)]
pub struct ImportMetrics {
    /// Rows accepted
    pub records_read: AtomicU64,

    /// Rows rejected by a field rule
    pub rejected: AtomicU64,

    /// Rows that could not be parsed
    pub parse_errors: AtomicU64,
}

impl ImportMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record accepted row
    pub fn record_read(&self) {
        self.records_read.fetch_add(1, Ordering::Relaxed);
        counter!("training_import_records_total").increment(1);
    }

    /// Record rejected row
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        counter!("training_import_rejected_total", "reason" => "validation").increment(1);
    }

    /// Record parse error
    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
        counter!("training_import_rejected_total", "reason" => "parse").increment(1);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_read: self.records_read.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_read: u64,
    pub rejected: u64,
    pub parse_errors: u64,
}
