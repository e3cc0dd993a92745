//! Traditional execution and coordination metrics.
//!
//! Pure functions of their inputs. Unlike the graph and judge tiers, this
//! tier treats an empty input as an error: there is no meaningful default
//! execution time for zero tasks.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::error::{EvalError, Result};
use crate::domain::metrics::Metrics;
use crate::domain::records::{seconds_between, CoordinationEvent, TaskResult};

/// Elapsed seconds between two timestamps expressed in seconds.
///
/// Rejects `end < start`; never clamps to zero.
pub fn calculate_execution_time(start: f64, end: f64) -> Result<f64> {
    if !start.is_finite() || !end.is_finite() {
        return Err(EvalError::InvalidInput(format!(
            "timestamps must be finite, got start={start} end={end}"
        )));
    }
    if end < start {
        return Err(EvalError::NegativeDuration {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(end - start)
}

/// Elapsed seconds between two UTC instants.
pub fn calculate_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64> {
    seconds_between(start, end)
}

/// Fraction of `true` outcomes.
pub fn calculate_success_rate(outcomes: &[bool]) -> Result<f64> {
    if outcomes.is_empty() {
        return Err(EvalError::empty("task outcomes"));
    }
    let successes = outcomes.iter().filter(|ok| **ok).count();
    Ok(successes as f64 / outcomes.len() as f64)
}

/// Fraction of successful coordination events.
///
/// No events means no coordination was required, which scores `1.0`.
pub fn calculate_coordination_quality(events: &[CoordinationEvent]) -> f64 {
    if events.is_empty() {
        return 1.0;
    }
    let successes = events.iter().filter(|e| e.success).count();
    successes as f64 / events.len() as f64
}

/// Calculator for the traditional tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraditionalMetricsEvaluator;

impl TraditionalMetricsEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Metrics over per-task records.
    ///
    /// * `execution_time_seconds`: mean per-task execution time
    /// * `success_rate`: fraction of successful tasks
    /// * `coordination_quality`: mean `coordination_score`
    pub fn calculate(&self, results: &[TaskResult]) -> Result<Metrics> {
        if results.is_empty() {
            return Err(EvalError::empty("task results"));
        }

        let mut total_time = 0.0;
        let mut total_coordination = 0.0;
        let mut successes = 0usize;
        for result in results {
            result.validate()?;
            total_time += result.execution_time_seconds()?;
            total_coordination += result.coordination_score;
            if result.success {
                successes += 1;
            }
        }

        let n = results.len() as f64;
        let metrics = Metrics::new(
            total_time / n,
            successes as f64 / n,
            total_coordination / n,
        )?;
        debug!(
            tasks = results.len(),
            success_rate = metrics.success_rate,
            coordination_quality = metrics.coordination_quality,
            "traditional metrics calculated"
        );
        Ok(metrics)
    }

    /// Metrics over a run window, task outcomes and discrete coordination
    /// events.
    pub fn calculate_from_events(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        task_outcomes: &[bool],
        coordination_events: &[CoordinationEvent],
    ) -> Result<Metrics> {
        let execution_time = calculate_duration(start_time, end_time)?;
        let success_rate = calculate_success_rate(task_outcomes)?;
        let coordination_quality = calculate_coordination_quality(coordination_events);
        Metrics::new(execution_time, success_rate, coordination_quality)
    }

    /// Apply [`calculate`](Self::calculate) to each run independently.
    ///
    /// Output order matches input order. An empty batch, or any empty run,
    /// fails with [`EvalError::EmptyInput`].
    pub fn evaluate_batch(&self, runs: &[Vec<TaskResult>]) -> Result<Vec<Metrics>> {
        if runs.is_empty() {
            return Err(EvalError::empty("batch of runs"));
        }
        runs.iter().map(|run| self.calculate(run)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn task(id: &str, secs: i64, success: bool, score: f64) -> TaskResult {
        TaskResult::new(id, "agent", t0(), t0() + Duration::seconds(secs), success, score).unwrap()
    }

    #[test]
    fn test_execution_time() {
        assert_eq!(calculate_execution_time(100.0, 145.5).unwrap(), 45.5);
        assert_eq!(calculate_execution_time(10.0, 10.0).unwrap(), 0.0);
    }

    #[test]
    fn test_execution_time_rejects_reversed_window() {
        let err = calculate_execution_time(100.0, 50.0).unwrap_err();
        assert!(matches!(err, EvalError::NegativeDuration { .. }));
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(
            calculate_success_rate(&[true, true, false, false]).unwrap(),
            0.5
        );
        assert_eq!(calculate_success_rate(&[true]).unwrap(), 1.0);
        assert!(matches!(
            calculate_success_rate(&[]),
            Err(EvalError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_coordination_quality_defaults_to_perfect() {
        assert_eq!(calculate_coordination_quality(&[]), 1.0);
        let events = vec![
            CoordinationEvent::new("a", t0(), true),
            CoordinationEvent::new("b", t0(), false),
            CoordinationEvent::new("c", t0(), true),
            CoordinationEvent::new("d", t0(), true),
        ];
        assert_eq!(calculate_coordination_quality(&events), 0.75);
    }

    #[test]
    fn test_calculate_over_task_results() {
        let results = vec![task("t1", 10, true, 0.8), task("t2", 20, false, 0.6)];
        let m = TraditionalMetricsEvaluator::new().calculate(&results).unwrap();
        assert_eq!(m.execution_time_seconds, 15.0);
        assert_eq!(m.success_rate, 0.5);
        assert!((m.coordination_quality - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_calculate_keeps_sub_millisecond_tasks() {
        let quick = TaskResult::new(
            "t1",
            "agent",
            t0(),
            t0() + Duration::microseconds(400),
            true,
            1.0,
        )
        .unwrap();
        let m = TraditionalMetricsEvaluator::new().calculate(&[quick]).unwrap();
        assert!((m.execution_time_seconds - 0.0004).abs() < 1e-12);
        let window = calculate_duration(t0(), t0() + Duration::microseconds(1_500)).unwrap();
        assert!((window - 0.0015).abs() < 1e-12);
    }

    #[test]
    fn test_calculate_rejects_empty() {
        let err = TraditionalMetricsEvaluator::new().calculate(&[]).unwrap_err();
        assert!(matches!(err, EvalError::EmptyInput { .. }));
    }

    #[test]
    fn test_calculate_rechecks_deserialized_records() {
        let mut bad = task("t1", 10, true, 0.5);
        bad.end_time = t0() - Duration::seconds(5);
        let err = TraditionalMetricsEvaluator::new().calculate(&[bad]).unwrap_err();
        assert!(matches!(err, EvalError::NegativeDuration { .. }));
    }

    #[test]
    fn test_calculate_from_events() {
        let events = vec![
            CoordinationEvent::new("a", t0(), true),
            CoordinationEvent::new("b", t0(), false),
        ];
        let m = TraditionalMetricsEvaluator::new()
            .calculate_from_events(t0(), t0() + Duration::seconds(30), &[true, false, true, true], &events)
            .unwrap();
        assert_eq!(m.execution_time_seconds, 30.0);
        assert_eq!(m.success_rate, 0.75);
        assert_eq!(m.coordination_quality, 0.5);
    }

    #[test]
    fn test_calculate_from_events_rejects_reversed_window() {
        let err = TraditionalMetricsEvaluator::new()
            .calculate_from_events(t0(), t0() - Duration::seconds(1), &[true], &[])
            .unwrap_err();
        assert!(matches!(err, EvalError::NegativeDuration { .. }));
    }

    #[test]
    fn test_evaluate_batch_preserves_order() {
        let runs = vec![
            vec![task("a", 10, true, 1.0)],
            vec![task("b", 40, false, 0.0), task("c", 20, false, 0.5)],
        ];
        let out = TraditionalMetricsEvaluator::new().evaluate_batch(&runs).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].success_rate, 1.0);
        assert_eq!(out[0].execution_time_seconds, 10.0);
        assert_eq!(out[1].success_rate, 0.0);
        assert_eq!(out[1].execution_time_seconds, 30.0);
    }

    #[test]
    fn test_evaluate_batch_rejects_empty_batch() {
        let err = TraditionalMetricsEvaluator::new().evaluate_batch(&[]).unwrap_err();
        assert!(matches!(err, EvalError::EmptyInput { .. }));
    }
}
