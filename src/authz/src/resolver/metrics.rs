//! Resolver metrics collection

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Resolver activity counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverMetrics {
    /// Permission checks answered (allowed + denied)
    pub total_checks: u64,

    pub allowed_checks: u64,

    pub denied_checks: u64,

    /// Loads from the aggregate store that failed
    pub load_errors: u64,

    /// Invalidation calls, whether or not an entry was cached
    pub invalidations: u64,

    /// Completed warmup passes
    pub warmups: u64,

    /// Roles skipped during warmup because their load failed
    pub warmup_skipped_roles: u64,

    /// Latency percentiles over recent checks
    pub latency_p50_ms: f64,
    pub latency_p99_ms: f64,

    pub avg_latency_ms: f64,
}

impl ResolverMetrics {
    /// Calculate allow rate
    pub fn allow_rate(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.allowed_checks as f64 / self.total_checks as f64
        }
    }
}

/// Metrics collector shared by resolver calls
///
/// Recording is a few atomic increments plus one push into a bounded
/// window. Percentiles are computed when a snapshot is taken.
pub struct MetricsCollector {
    total_checks: AtomicU64,
    allowed_checks: AtomicU64,
    load_errors: AtomicU64,
    invalidations: AtomicU64,
    warmups: AtomicU64,
    warmup_skipped_roles: AtomicU64,

    /// Most recent check latencies in milliseconds, oldest first
    latency_samples: Mutex<VecDeque<f64>>,

    max_samples: usize,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::with_max_samples(10_000)
    }

    pub fn with_max_samples(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            total_checks: AtomicU64::new(0),
            allowed_checks: AtomicU64::new(0),
            load_errors: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            warmups: AtomicU64::new(0),
            warmup_skipped_roles: AtomicU64::new(0),
            latency_samples: Mutex::new(VecDeque::with_capacity(max_samples.min(10_000))),
            max_samples,
        }
    }

    /// Record a resolved permission check
    pub async fn record_check(&self, allowed: bool, latency: Duration) {
        self.total_checks.fetch_add(1, Ordering::Relaxed);
        if allowed {
            self.allowed_checks.fetch_add(1, Ordering::Relaxed);
        }

        let mut samples = self.latency_samples.lock();
        if samples.len() == self.max_samples {
            samples.pop_front();
        }
        samples.push_back(latency.as_secs_f64() * 1000.0);
    }

    pub async fn record_load_error(&self) {
        self.load_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn record_warmup(&self, skipped_roles: usize) {
        self.warmups.fetch_add(1, Ordering::Relaxed);
        self.warmup_skipped_roles
            .fetch_add(skipped_roles as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub async fn get_metrics(&self) -> ResolverMetrics {
        let mut sorted: Vec<f64> = self.latency_samples.lock().iter().copied().collect();
        let avg = sorted.iter().sum::<f64>() / sorted.len().max(1) as f64;
        sorted.sort_by(f64::total_cmp);

        let total_checks = self.total_checks.load(Ordering::Relaxed);
        let allowed_checks = self.allowed_checks.load(Ordering::Relaxed);

        ResolverMetrics {
            total_checks,
            allowed_checks,
            denied_checks: total_checks.saturating_sub(allowed_checks),
            load_errors: self.load_errors.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            warmups: self.warmups.load(Ordering::Relaxed),
            warmup_skipped_roles: self.warmup_skipped_roles.load(Ordering::Relaxed),
            latency_p50_ms: Self::percentile(&sorted, 0.50),
            latency_p99_ms: Self::percentile(&sorted, 0.99),
            avg_latency_ms: avg,
        }
    }

    pub async fn reset(&self) {
        for counter in [
            &self.total_checks,
            &self.allowed_checks,
            &self.load_errors,
            &self.invalidations,
            &self.warmups,
            &self.warmup_skipped_roles,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.latency_samples.lock().clear();
    }

    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }

        let idx = ((sorted.len() as f64) * p) as usize;
        sorted[idx.min(sorted.len() - 1)]
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
