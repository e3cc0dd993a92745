use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::domain::evaluation::Evaluation;
use crate::domain::metrics::{GraphMetrics, Metrics};
use crate::pipeline::{ConfigSnapshot, JudgeStatus, PipelineResult};

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Judge-tier aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JudgeSummaryArtifact {
    pub status: JudgeStatus,
    pub num_evaluations: usize,
    /// Mean score on the configured scale; `null` without evaluations.
    pub avg_judge_score: Option<f64>,
    /// Mean score mapped onto `[0, 1]`; `null` without evaluations.
    pub avg_normalized_judge_score: Option<f64>,
}

/// Canonical report artifact written after a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsolidatedReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub seed: u64,
    pub execution_time: f64,
    pub config: ConfigSnapshot,
    pub traditional_metrics: Option<Metrics>,
    pub graph_metrics: Option<GraphMetrics>,
    pub judge: JudgeSummaryArtifact,
    pub llm_judge_results: Vec<Evaluation>,
    pub summary: String,
}

impl ConsolidatedReport {
    pub fn from_result(result: &PipelineResult) -> Self {
        let avg_judge_score = result.avg_judge_score();
        let avg_normalized_judge_score = if result.llm_judge_results.is_empty() {
            None
        } else {
            let total: f64 = result
                .llm_judge_results
                .iter()
                .map(Evaluation::normalized_score)
                .sum();
            Some(total / result.llm_judge_results.len() as f64)
        };
        let judge = JudgeSummaryArtifact {
            status: result.judge_status,
            num_evaluations: result.llm_judge_results.len(),
            avg_judge_score,
            avg_normalized_judge_score,
        };

        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            run_id: result.run_id,
            timestamp: result.timestamp,
            seed: result.seed,
            execution_time: result.execution_time,
            config: result.config.clone(),
            traditional_metrics: result.traditional_metrics,
            graph_metrics: result.graph_metrics,
            summary: render_summary(result, &judge),
            judge,
            llm_judge_results: result.llm_judge_results.clone(),
        }
    }
}

/// One-line human summary, e.g. for CLI output.
pub fn render_summary(result: &PipelineResult, judge: &JudgeSummaryArtifact) -> String {
    let mut parts = Vec::new();
    match &result.traditional_metrics {
        Some(m) => parts.push(format!(
            "traditional: time={:.3}s success={:.2} coordination={:.2}",
            m.execution_time_seconds, m.success_rate, m.coordination_quality
        )),
        None => parts.push("traditional: disabled".to_string()),
    }
    match &result.graph_metrics {
        Some(g) => parts.push(format!(
            "graph: nodes={} edges={} density={:.3}",
            g.num_nodes, g.num_edges, g.density
        )),
        None => parts.push("graph: disabled".to_string()),
    }
    match (judge.status, judge.avg_judge_score) {
        (JudgeStatus::Ran, Some(avg)) => parts.push(format!(
            "judge: {} evaluations avg={avg:.2}",
            judge.num_evaluations
        )),
        (JudgeStatus::Disabled, _) => parts.push("judge: disabled".to_string()),
        _ => parts.push("judge: no input".to_string()),
    }
    parts.join(" | ")
}

/// Write the report as pretty JSON, creating parent directories.
pub fn write_report_json(path: &Path, report: &ConsolidatedReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
    }
    let content = serde_json::to_string_pretty(report).context("serialize report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
