//! Operation counters and latency tracking for the order store
//!
//! Counters are plain atomics on separate cache lines so that threads
//! working on different symbols do not contend on them. Latency samples go
//! into HDR histograms and are recorded after the symbol lock is released.

use crossbeam::utils::CachePadded;
use hdrhistogram::{CreationError, Histogram};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Store operations tracked for latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationType {
    /// Insert (aggregating or opening a level)
    Insert = 0,
    /// Remove all levels of a symbol
    Remove = 1,
    /// Full-store snapshot
    Snapshot = 2,
}

const OPERATION_COUNT: usize = 3;

/// Counters and latency histograms for one store
pub struct StoreMetrics {
    inserts: CachePadded<AtomicU64>,
    levels_opened: CachePadded<AtomicU64>,
    aggregations: CachePadded<AtomicU64>,
    rejected_orders: CachePadded<AtomicU64>,
    removals: CachePadded<AtomicU64>,
    remove_misses: CachePadded<AtomicU64>,
    snapshots: CachePadded<AtomicU64>,
    latency: Option<LatencyTracker>,
}

impl StoreMetrics {
    /// Create metrics; latency histograms are only kept when `track_latency` is set
    #[must_use]
    pub fn new(track_latency: bool) -> Self {
        Self {
            inserts: CachePadded::new(AtomicU64::new(0)),
            levels_opened: CachePadded::new(AtomicU64::new(0)),
            aggregations: CachePadded::new(AtomicU64::new(0)),
            rejected_orders: CachePadded::new(AtomicU64::new(0)),
            removals: CachePadded::new(AtomicU64::new(0)),
            remove_misses: CachePadded::new(AtomicU64::new(0)),
            snapshots: CachePadded::new(AtomicU64::new(0)),
            // Tracking is turned off rather than failing the store
            latency: track_latency.then(LatencyTracker::new).and_then(|tracker| {
                tracker
                    .inspect_err(|e| tracing::warn!("latency tracking disabled: {e}"))
                    .ok()
            }),
        }
    }

    /// Start timing an operation. Returns `None` when latency tracking is off.
    #[inline]
    pub fn start(&self) -> Option<Instant> {
        self.latency.as_ref().map(|_| Instant::now())
    }

    #[inline]
    fn finish(&self, op: OperationType, started: Option<Instant>) {
        if let (Some(tracker), Some(start)) = (&self.latency, started) {
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            tracker.record_operation(op, nanos);
        }
    }

    /// Record an insert that opened a new price level
    #[inline]
    pub fn record_new_level(&self, started: Option<Instant>) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.levels_opened.fetch_add(1, Ordering::Relaxed);
        self.finish(OperationType::Insert, started);
    }

    /// Record an insert that aggregated into an existing level
    #[inline]
    pub fn record_aggregation(&self, started: Option<Instant>) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.aggregations.fetch_add(1, Ordering::Relaxed);
        self.finish(OperationType::Insert, started);
    }

    /// Record an insert rejected by validation or overflow
    #[inline]
    pub fn record_rejected(&self) {
        self.rejected_orders.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a remove; `found` is false for a symbol with no orders
    #[inline]
    pub fn record_remove(&self, found: bool, started: Option<Instant>) {
        if found {
            self.removals.fetch_add(1, Ordering::Relaxed);
        } else {
            self.remove_misses.fetch_add(1, Ordering::Relaxed);
        }
        self.finish(OperationType::Remove, started);
    }

    /// Record a completed snapshot
    #[inline]
    pub fn record_snapshot(&self, started: Option<Instant>) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
        self.finish(OperationType::Snapshot, started);
    }

    /// Current metrics snapshot
    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inserts: self.inserts.load(Ordering::Acquire),
            levels_opened: self.levels_opened.load(Ordering::Acquire),
            aggregations: self.aggregations.load(Ordering::Acquire),
            rejected_orders: self.rejected_orders.load(Ordering::Acquire),
            removals: self.removals.load(Ordering::Acquire),
            remove_misses: self.remove_misses.load(Ordering::Acquire),
            snapshots: self.snapshots.load(Ordering::Acquire),
            latency_stats: self
                .latency
                .as_ref()
                .map(LatencyTracker::get_stats)
                .unwrap_or_default(),
        }
    }
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Latency tracker using HDR histograms for accurate percentiles
pub struct LatencyTracker {
    histograms: Mutex<[Histogram<u64>; OPERATION_COUNT]>,
}

impl LatencyTracker {
    /// Create a new latency tracker with 3 significant digits per histogram
    pub fn new() -> Result<Self, CreationError> {
        Ok(Self {
            histograms: Mutex::new([Histogram::new(3)?, Histogram::new(3)?, Histogram::new(3)?]),
        })
    }

    /// Record a latency measurement in nanoseconds
    #[inline]
    pub fn record_operation(&self, op_type: OperationType, latency_ns: u64) {
        let mut histograms = self.histograms.lock();
        // Saturates instead of failing on out-of-range samples
        histograms[op_type as usize].saturating_record(latency_ns);
    }

    /// Latency statistics per operation
    pub fn get_stats(&self) -> LatencyStats {
        let histograms = self.histograms.lock();
        let summarize = |hist: &Histogram<u64>| {
            (!hist.is_empty()).then(|| OperationLatency {
                count: hist.len(),
                min: hist.min(),
                max: hist.max(),
                mean: hist.mean() as u64,
                p50: hist.value_at_quantile(0.50),
                p90: hist.value_at_quantile(0.90),
                p99: hist.value_at_quantile(0.99),
                p999: hist.value_at_quantile(0.999),
            })
        };

        LatencyStats {
            insert: summarize(&histograms[OperationType::Insert as usize]),
            remove: summarize(&histograms[OperationType::Remove as usize]),
            snapshot: summarize(&histograms[OperationType::Snapshot as usize]),
        }
    }
}

/// Latency statistics for an operation type, in nanoseconds
#[derive(Debug, Clone, Default)]
pub struct OperationLatency {
    /// Number of samples
    pub count: u64,
    /// Minimum latency
    pub min: u64,
    /// Maximum latency
    pub max: u64,
    /// Mean latency
    pub mean: u64,
    /// 50th percentile
    pub p50: u64,
    /// 90th percentile
    pub p90: u64,
    /// 99th percentile
    pub p99: u64,
    /// 99.9th percentile
    pub p999: u64,
}

/// Latency statistics for all tracked operations
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    /// Insert latency
    pub insert: Option<OperationLatency>,
    /// Remove latency
    pub remove: Option<OperationLatency>,
    /// Snapshot latency
    pub snapshot: Option<OperationLatency>,
}

/// Point-in-time copy of the store counters
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Accepted inserts
    pub inserts: u64,
    /// Inserts that opened a new price level
    pub levels_opened: u64,
    /// Inserts that aggregated into an existing level
    pub aggregations: u64,
    /// Inserts rejected by validation or overflow
    pub rejected_orders: u64,
    /// Removes that dropped a symbol's orders
    pub removals: u64,
    /// Removes of a symbol with no orders
    pub remove_misses: u64,
    /// Completed snapshots
    pub snapshots: u64,
    /// Latency summaries; empty when tracking is off
    pub latency_stats: LatencyStats,
}

impl MetricsSnapshot {
    /// Format metrics as a report
    #[must_use]
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Order Store Metrics ===\n");
        report.push_str(&format!(
            "Inserts: {} ({} new levels, {} aggregated, {} rejected)\n",
            self.inserts, self.levels_opened, self.aggregations, self.rejected_orders
        ));
        report.push_str(&format!(
            "Removals: {} ({} not found)\n",
            self.removals, self.remove_misses
        ));
        report.push_str(&format!("Snapshots: {}\n", self.snapshots));

        let sections = [
            ("Insert", &self.latency_stats.insert),
            ("Remove", &self.latency_stats.remove),
            ("Snapshot", &self.latency_stats.snapshot),
        ];
        for (name, stats) in sections {
            if let Some(stats) = stats {
                report.push_str(&format!("\n{name} Latency (ns, {} samples):\n", stats.count));
                report.push_str(&format!(
                    "  p50: {}, p90: {}, p99: {}, p99.9: {}, max: {}\n",
                    stats.p50, stats.p90, stats.p99, stats.p999, stats.max
                ));
            }
        }

        report
    }
}
