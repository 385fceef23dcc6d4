//! Process-wide resolution metrics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use repsage_core::Tier;
use serde::Serialize;

/// Point-in-time view of the counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub total_requests: u64,
    /// Every tier is listed, including those never used.
    pub tier_usage_counts: BTreeMap<String, u64>,
    pub average_elapsed_ms: f64,
    pub semantic_cache_hits: u64,
    pub semantic_cache_misses: u64,
}

/// Lock-free counters plus a mutex-guarded running mean.
#[derive(Default)]
pub struct MetricsTracker {
    total: AtomicU64,
    tiers: [AtomicU64; 5],
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    /// (samples, mean)
    elapsed: Mutex<(u64, f64)>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished resolution.
    pub fn record(&self, tier: Tier, elapsed_ms: u64) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.tiers[tier.index()].fetch_add(1, Ordering::Relaxed);

        let mut elapsed = self.elapsed.lock();
        elapsed.0 += 1;
        elapsed.1 += (elapsed_ms as f64 - elapsed.1) / elapsed.0 as f64;
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PerformanceMetrics {
        let tier_usage_counts = Tier::PIPELINE
            .iter()
            .map(|t| (t.as_str().to_string(), self.tiers[t.index()].load(Ordering::Relaxed)))
            .collect();
        PerformanceMetrics {
            total_requests: self.total.load(Ordering::Relaxed),
            tier_usage_counts,
            average_elapsed_ms: self.elapsed.lock().1,
            semantic_cache_hits: self.cache_hits.load(Ordering::Relaxed),
            semantic_cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
        for counter in &self.tiers {
            counter.store(0, Ordering::Relaxed);
        }
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        *self.elapsed.lock() = (0, 0.0);
    }
}
