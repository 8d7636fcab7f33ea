use chrono::{DateTime, Utc};
use hdrhistogram::Histogram;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Point-in-time view of cumulative ingestion counters and derived rates.
/// Rates are cumulative-over-total-elapsed, never an instantaneous window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionStats {
    pub timestamp: DateTime<Utc>,
    pub total_documents: u64,
    pub total_data_size_kb: u64,
    pub documents_per_second: f64,
    pub kb_per_second: f64,
}

/// Cumulative counters for one run. Written only by the pump loop, read
/// concurrently by a polling reporter; atomic loads avoid torn 64-bit reads.
/// Created fresh per run so counters always start from zero.
pub struct StatsAggregator {
    documents: AtomicU64,
    data_size_kb: AtomicU64,
    started: Instant,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            documents: AtomicU64::new(0),
            data_size_kb: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Add one completed batch's attempted document and kilobyte counts.
    pub fn record_batch(&self, documents: u64, data_size_kb: u64) {
        self.documents.fetch_add(documents, Ordering::Release);
        self.data_size_kb.fetch_add(data_size_kb, Ordering::Release);
    }

    pub fn total_documents(&self) -> u64 {
        self.documents.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> IngestionStats {
        self.snapshot_at(self.started.elapsed())
    }

    /// Snapshot with an injected elapsed duration; lets tests pin the clock.
    pub fn snapshot_at(&self, elapsed: Duration) -> IngestionStats {
        let documents = self.documents.load(Ordering::Acquire);
        let data_size_kb = self.data_size_kb.load(Ordering::Acquire);
        let secs = elapsed.as_secs_f64();
        let (documents_per_second, kb_per_second) = if secs > 0.0 {
            (documents as f64 / secs, data_size_kb as f64 / secs)
        } else {
            (0.0, 0.0)
        };
        IngestionStats {
            timestamp: Utc::now(),
            total_documents: documents,
            total_data_size_kb: data_size_kb,
            documents_per_second,
            kb_per_second,
        }
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub p999_ms: f64,
}

/// Per-write latency histogram for a run. Not part of the 1 Hz snapshot;
/// percentiles are surfaced once in the final run summary.
pub struct LatencyRecorder {
    hist: Histogram<u64>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self {
            // 3 significant figures.
            hist: Histogram::new(3).expect("histogram construction cannot fail"),
        }
    }

    pub fn record(&mut self, dur: Duration) {
        let us = dur.as_micros() as u64;
        let _ = self.hist.record(us.max(1));
    }

    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    pub fn to_stats(&self) -> LatencyStats {
        LatencyStats {
            p50_ms: self.hist.value_at_quantile(0.50) as f64 / 1000.0,
            p95_ms: self.hist.value_at_quantile(0.95) as f64 / 1000.0,
            p99_ms: self.hist.value_at_quantile(0.99) as f64 / 1000.0,
            p999_ms: self.hist.value_at_quantile(0.999) as f64 / 1000.0,
        }
    }
}

impl Default for LatencyRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_cumulative_over_elapsed() {
        let stats = StatsAggregator::new();
        // 10 documents of 1 KB over exactly 2 seconds.
        stats.record_batch(5, 5);
        stats.record_batch(5, 5);
        let snap = stats.snapshot_at(Duration::from_secs(2));
        assert_eq!(snap.total_documents, 10);
        assert_eq!(snap.total_data_size_kb, 10);
        assert!((snap.documents_per_second - 5.0).abs() < 1e-9);
        assert!((snap.kb_per_second - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_elapsed_yields_zero_rates() {
        let stats = StatsAggregator::new();
        stats.record_batch(100, 100);
        let snap = stats.snapshot_at(Duration::ZERO);
        assert_eq!(snap.documents_per_second, 0.0);
        assert_eq!(snap.kb_per_second, 0.0);
        assert_eq!(snap.total_documents, 100);
    }

    #[test]
    fn fresh_aggregator_starts_at_zero() {
        let snap = StatsAggregator::new().snapshot();
        assert_eq!(snap.total_documents, 0);
        assert_eq!(snap.total_data_size_kb, 0);
    }

    #[test]
    fn latency_percentiles_ordered() {
        let mut rec = LatencyRecorder::new();
        for ms in 1..=100u64 {
            rec.record(Duration::from_millis(ms));
        }
        let stats = rec.to_stats();
        assert!(stats.p50_ms <= stats.p95_ms);
        assert!(stats.p95_ms <= stats.p99_ms);
        assert!(stats.p99_ms <= stats.p999_ms);
        assert_eq!(rec.count(), 100);
    }
}
