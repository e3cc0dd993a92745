//! Structured observability hooks for evaluation runs.
//!
//! This module provides:
//! - Run-scoped tracing spans: [`RunSpan::span`] for async code
//!   (attach with `Instrument`), the `RunSpan` RAII guard for sync code
//! - Emission functions for run and tier lifecycle events
//!
//! Events are emitted at `info!` level (`warn!` for failures) and carry an
//! `event` field so they can be filtered in JSON output.

use tracing::{info, warn};

use crate::domain::error::Tier;

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// ```ignore
/// let _span = RunSpan::enter("6f1c...");
/// // every tracing call below is associated with run_id = "6f1c..."
/// ```
///
/// The guard is `!Send` and must not be held across an `.await`; async
/// callers attach [`RunSpan::span`] with `tracing::Instrument` instead.
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    /// The `agenteval.run` span tagged with the run_id, not yet entered.
    pub fn span(run_id: &str) -> tracing::Span {
        tracing::info_span!("agenteval.run", run_id = %run_id)
    }

    /// Create and enter a span tagged with the run_id.
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: Self::span(run_id).entered(),
        }
    }
}

/// Emit event: run started with its seed and configuration digest.
pub fn emit_run_started(run_id: &str, seed: u64, config_digest: &str) {
    info!(
        event = "run.started",
        run_id = %run_id,
        seed = seed,
        config_digest = %config_digest,
    );
}

/// Emit event: a tier began executing.
pub fn emit_tier_started(run_id: &str, tier: Tier) {
    info!(event = "tier.started", run_id = %run_id, tier = %tier);
}

/// Emit event: a tier completed, with its own wall-clock duration.
pub fn emit_tier_finished(run_id: &str, tier: Tier, duration_ms: u64) {
    info!(
        event = "tier.finished",
        run_id = %run_id,
        tier = %tier,
        duration_ms = duration_ms,
    );
}

/// Emit event: tier not run, with the reason (`disabled`, `no_input`).
pub fn emit_tier_skipped(run_id: &str, tier: Tier, reason: &str) {
    info!(event = "tier.skipped", run_id = %run_id, tier = %tier, reason = %reason);
}

/// Emit event: tier failed (warning level). The run aborts after this.
pub fn emit_tier_failed(run_id: &str, tier: Tier, error: &dyn std::fmt::Display) {
    warn!(event = "tier.failed", run_id = %run_id, tier = %tier, error = %error);
}

/// Emit event: run finished with duration, evaluation count and success status.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, evaluations: usize, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        evaluations = evaluations,
        success = success,
    );
}

/// Emit event: one review pair scored by the judge.
pub fn emit_judge_pair_evaluated(model: &str, agent_review_id: &str, score: f64) {
    info!(
        event = "judge.pair_evaluated",
        model = %model,
        agent_review_id = %agent_review_id,
        score = score,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("test-run-id");
        emit_tier_started("test-run-id", Tier::Graph);
        emit_tier_skipped("test-run-id", Tier::Judge, "no_input");
    }
}
