//! Global atomic counters for evaluation runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Counters::flush`] to emit current values as a single `tracing::info!`
//! event (e.g. at the end of a CLI invocation). They never feed scoring.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counters singleton.
pub static COUNTERS: Counters = Counters::new();

/// Lightweight atomic counters; no allocations, no locking.
pub struct Counters {
    pipeline_runs: AtomicU64,
    judge_calls: AtomicU64,
    judge_failures: AtomicU64,
    tier_failures: AtomicU64,
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters {
    pub const fn new() -> Self {
        Self {
            pipeline_runs: AtomicU64::new(0),
            judge_calls: AtomicU64::new(0),
            judge_failures: AtomicU64::new(0),
            tier_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_pipeline_runs(&self) {
        self.pipeline_runs.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "pipeline_runs", "counter incremented");
    }

    pub fn inc_judge_calls(&self) {
        self.judge_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "judge_calls", "counter incremented");
    }

    pub fn inc_judge_failures(&self) {
        self.judge_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "judge_failures", "counter incremented");
    }

    pub fn inc_tier_failures(&self) {
        self.tier_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tier_failures", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            pipeline_runs = self.pipeline_runs(),
            judge_calls = self.judge_calls(),
            judge_failures = self.judge_failures(),
            tier_failures = self.tier_failures(),
        );
    }

    pub fn pipeline_runs(&self) -> u64 {
        self.pipeline_runs.load(Ordering::Relaxed)
    }

    pub fn judge_calls(&self) -> u64 {
        self.judge_calls.load(Ordering::Relaxed)
    }

    pub fn judge_failures(&self) -> u64 {
        self.judge_failures.load(Ordering::Relaxed)
    }

    pub fn tier_failures(&self) -> u64 {
        self.tier_failures.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.pipeline_runs.store(0, Ordering::Relaxed);
        self.judge_calls.store(0, Ordering::Relaxed);
        self.judge_failures.store(0, Ordering::Relaxed);
        self.tier_failures.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let c = Counters::new();
        assert_eq!(c.judge_calls(), 0);
        c.inc_judge_calls();
        c.inc_judge_calls();
        assert_eq!(c.judge_calls(), 2);

        c.inc_pipeline_runs();
        assert_eq!(c.pipeline_runs(), 1);

        c.inc_judge_failures();
        c.inc_tier_failures();
        c.inc_tier_failures();
        assert_eq!(c.judge_failures(), 1);
        assert_eq!(c.tier_failures(), 2);
    }

    #[test]
    fn reset_zeroes_all() {
        let c = Counters::new();
        c.inc_pipeline_runs();
        c.inc_judge_calls();
        c.inc_judge_failures();
        c.inc_tier_failures();
        c.reset();
        assert_eq!(c.pipeline_runs(), 0);
        assert_eq!(c.judge_calls(), 0);
        assert_eq!(c.judge_failures(), 0);
        assert_eq!(c.tier_failures(), 0);
    }
}
