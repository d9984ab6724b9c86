//! 导入运行指标
//!
//! Mirrors the bus counters and the lock wait into the `metrics` facade, and
//! keeps an in-memory summary for the end-of-run report.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use metrics::{counter, gauge, histogram};

/// 记录总线计数器
///
/// Called once per run; counters are absolute, so they are exported as gauges.
pub fn record_bus_metrics(snapshot: &MetricsSnapshot) {
    gauge!("training_import_bus_published").set(snapshot.published as f64);
    gauge!("training_import_bus_filtered").set(snapshot.filtered as f64);
    gauge!("training_import_bus_delivered").set(snapshot.delivered as f64);
}

/// 记录文件锁等待时间
pub fn record_lock_wait(waited: Duration, acquired: bool) {
    let status = if acquired { "acquired" } else { "timeout" };
    histogram!("training_import_lock_wait_ms", "status" => status).record(waited.as_secs_f64() * 1000.0);
}

/// 记录一次导入结果
pub fn record_import_outcome(records: usize, errors: usize) {
    counter!("training_import_runs_total").increment(1);
    if errors > 0 {
        counter!("training_import_runs_with_errors_total").increment(1);
    }
    gauge!("training_import_last_records").set(records as f64);
    gauge!("training_import_last_errors").set(errors as f64);
}

/// 运行摘要
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub records: usize,
    pub errors: usize,
    pub skipped_lines: usize,
    pub lock_wait: Option<Duration>,
    pub bus: MetricsSnapshot,
}

impl RunSummary {
    /// 被拒绝的行所占比例 (%)
    pub fn reject_rate(&self) -> f64 {
        let total = self.records + self.errors;
        if total == 0 {
            0.0
        } else {
            self.errors as f64 / total as f64 * 100.0
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Import Summary ===")?;
        writeln!(f, "Records accepted: {}", self.records)?;
        writeln!(
            f,
            "Rows rejected: {} ({:.2}%)",
            self.errors,
            self.reject_rate()
        )?;
        writeln!(f, "Preamble lines skipped: {}", self.skipped_lines)?;
        if let Some(wait) = self.lock_wait {
            writeln!(f, "File lock wait: {} ms", wait.as_millis())?;
        }
        writeln!(
            f,
            "Messages: {} published, {} filtered, {} deliveries",
            self.bus.published, self.bus.filtered, self.bus.delivered
        )
    }
}
