//! Three-tier evaluation pipeline.
//!
//! Tiers run in the fixed order traditional → graph → judge. The first tier
//! to fail aborts the run; the error is wrapped in
//! [`EvalError::TierFailed`] naming the tier, and no partial result is
//! returned.
//!
//! The pipeline owns its random number generator. With a configured seed,
//! two pipelines fed identical inputs produce identical metrics and, with a
//! deterministic judge, identical judge scores. Run ids and timestamps are
//! identity fields and are never seed-controlled.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::config::{GraphConfig, PipelineConfig, TierToggles};
use crate::counters::COUNTERS;
use crate::domain::error::{EvalError, Result, Tier};
use crate::domain::evaluation::{Evaluation, ScoreScale};
use crate::domain::metrics::{GraphMetrics, Metrics};
use crate::domain::records::{AgentInteraction, CoordinationEvent, TaskResult};
use crate::domain::review::{Review, ReviewPair};
use crate::graph::GraphComplexityAnalyzer;
use crate::judge::{JudgeModel, SemanticJudge};
use crate::obs::{self, RunSpan};
use crate::traditional::TraditionalMetricsEvaluator;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Data for the traditional tier, in one of its two accepted shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraditionalInput {
    /// Per-task records; execution time is the mean task duration.
    Tasks(Vec<TaskResult>),
    /// One run window with task outcomes and coordination events.
    Events {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        task_outcomes: Vec<bool>,
        #[serde(default)]
        coordination_events: Vec<CoordinationEvent>,
    },
}

/// One batch handed to [`EvaluationPipeline::run`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineInput {
    pub traditional: Option<TraditionalInput>,
    pub interactions: Vec<AgentInteraction>,
    pub agent_reviews: Vec<Review>,
    pub baseline_reviews: Vec<Review>,
}

impl PipelineInput {
    pub fn from_tasks(tasks: Vec<TaskResult>) -> Self {
        Self {
            traditional: Some(TraditionalInput::Tasks(tasks)),
            ..Self::default()
        }
    }

    pub fn with_traditional(mut self, input: TraditionalInput) -> Self {
        self.traditional = Some(input);
        self
    }

    pub fn with_interactions(mut self, interactions: Vec<AgentInteraction>) -> Self {
        self.interactions = interactions;
        self
    }

    pub fn with_reviews(mut self, agent: Vec<Review>, baseline: Vec<Review>) -> Self {
        self.agent_reviews = agent;
        self.baseline_reviews = baseline;
        self
    }

    pub fn with_pairs(self, pairs: Vec<ReviewPair>) -> Self {
        let (agent, baseline) = pairs.into_iter().map(|p| (p.agent, p.baseline)).unzip();
        self.with_reviews(agent, baseline)
    }

    fn has_reviews(&self) -> bool {
        !(self.agent_reviews.is_empty() && self.baseline_reviews.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Why `llm_judge_results` holds what it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeStatus {
    Ran,
    /// Enabled, but the batch carried no review pairs.
    SkippedNoInput,
    /// Turned off in configuration.
    Disabled,
}

/// Configuration facts recorded with every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub digest: String,
    pub seed: u64,
    pub tiers: TierToggles,
    pub judge_model: String,
    pub score_scale: ScoreScale,
    pub graph: GraphConfig,
}

/// Aggregated output of one successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Fresh per run, regardless of seed.
    pub run_id: Uuid,
    /// When the run started (RFC 3339 in JSON).
    pub timestamp: DateTime<Utc>,
    /// Seed the pipeline was built with, configured or drawn from entropy.
    pub seed: u64,
    pub config: ConfigSnapshot,
    /// `None` when the tier is disabled.
    pub traditional_metrics: Option<Metrics>,
    /// `None` when the tier is disabled.
    pub graph_metrics: Option<GraphMetrics>,
    /// One entry per review pair, in input order.
    pub llm_judge_results: Vec<Evaluation>,
    pub judge_status: JudgeStatus,
    /// Wall-clock seconds for the whole run.
    pub execution_time: f64,
}

impl PipelineResult {
    /// Mean judge score on the configured scale, `None` without evaluations.
    pub fn avg_judge_score(&self) -> Option<f64> {
        if self.llm_judge_results.is_empty() {
            return None;
        }
        let total: f64 = self.llm_judge_results.iter().map(|e| e.score).sum();
        Some(total / self.llm_judge_results.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Where a pipeline is in its current (or last) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "tier", rename_all = "snake_case")]
pub enum PipelineStage {
    Configured,
    Running(Tier),
    Aggregated,
    Returned,
    Failed(Tier),
}

/// Orchestrator for the three tiers.
///
/// Reusable across sequential runs; each run draws a fresh judge sampling
/// seed from the owned RNG. Not meant to be shared between concurrent runs.
pub struct EvaluationPipeline {
    config: PipelineConfig,
    seed: u64,
    rng: StdRng,
    traditional: TraditionalMetricsEvaluator,
    graph: GraphComplexityAnalyzer,
    judge: SemanticJudge,
    stage: PipelineStage,
}

impl std::fmt::Debug for EvaluationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationPipeline")
            .field("seed", &self.seed)
            .field("stage", &self.stage)
            .field("judge", &self.judge)
            .finish_non_exhaustive()
    }
}

impl EvaluationPipeline {
    /// Validate `config` and build the tiers. Without a configured seed one
    /// is drawn from OS entropy and recorded in every result.
    pub fn new(config: PipelineConfig, judge_model: Arc<dyn JudgeModel>) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| StdRng::from_entropy().gen());
        let judge = SemanticJudge::from_config(judge_model, &config.judge);
        let graph = GraphComplexityAnalyzer::new(config.graph);
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            traditional: TraditionalMetricsEvaluator::new(),
            graph,
            judge,
            stage: PipelineStage::Configured,
            config,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn graph_analyzer(&self) -> &GraphComplexityAnalyzer {
        &self.graph
    }

    pub fn judge(&self) -> &SemanticJudge {
        &self.judge
    }

    /// Run every enabled tier over `input`.
    ///
    /// The judge tier is skipped, not failed, when the batch has no reviews;
    /// [`PipelineResult::judge_status`] tells this apart from a disabled tier.
    pub async fn run(&mut self, input: &PipelineInput) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let span = RunSpan::span(&run_id.to_string());
        self.execute(input, run_id).instrument(span).await
    }

    async fn execute(&mut self, input: &PipelineInput, run_id: Uuid) -> Result<PipelineResult> {
        let started = Instant::now();
        let rid = run_id.to_string();

        COUNTERS.inc_pipeline_runs();
        self.stage = PipelineStage::Configured;
        let digest = self.config.digest()?;
        obs::emit_run_started(&rid, self.seed, &digest);
        let timestamp = Utc::now();
        let sampling_seed: u64 = self.rng.gen();

        let tiers = self.config.tiers;

        let traditional_metrics = if tiers.traditional {
            let tier_started = self.enter(&rid, Tier::Traditional);
            let outcome = self.traditional_tier(input.traditional.as_ref());
            let metrics = self.settle(&rid, Tier::Traditional, outcome, started)?;
            obs::emit_tier_finished(&rid, Tier::Traditional, elapsed_ms(tier_started));
            Some(metrics)
        } else {
            obs::emit_tier_skipped(&rid, Tier::Traditional, "disabled");
            None
        };

        let graph_metrics = if tiers.graph {
            let tier_started = self.enter(&rid, Tier::Graph);
            let outcome = self.graph.analyze(&input.interactions);
            let metrics = self.settle(&rid, Tier::Graph, outcome, started)?;
            obs::emit_tier_finished(&rid, Tier::Graph, elapsed_ms(tier_started));
            Some(metrics)
        } else {
            obs::emit_tier_skipped(&rid, Tier::Graph, "disabled");
            None
        };

        let (llm_judge_results, judge_status) = if !tiers.judge {
            obs::emit_tier_skipped(&rid, Tier::Judge, "disabled");
            (Vec::new(), JudgeStatus::Disabled)
        } else if !input.has_reviews() {
            obs::emit_tier_skipped(&rid, Tier::Judge, "no_input");
            (Vec::new(), JudgeStatus::SkippedNoInput)
        } else {
            let tier_started = self.enter(&rid, Tier::Judge);
            let outcome = self
                .judge
                .batch_evaluate_with_seed(
                    &input.agent_reviews,
                    &input.baseline_reviews,
                    None,
                    sampling_seed,
                )
                .await;
            let evaluations = self.settle(&rid, Tier::Judge, outcome, started)?;
            obs::emit_tier_finished(&rid, Tier::Judge, elapsed_ms(tier_started));
            (evaluations, JudgeStatus::Ran)
        };

        self.stage = PipelineStage::Aggregated;
        let result = PipelineResult {
            run_id,
            timestamp,
            seed: self.seed,
            config: ConfigSnapshot {
                digest,
                seed: self.seed,
                tiers,
                judge_model: self.judge.model_id().to_string(),
                score_scale: self.judge.score_scale(),
                graph: self.config.graph,
            },
            traditional_metrics,
            graph_metrics,
            llm_judge_results,
            judge_status,
            execution_time: started.elapsed().as_secs_f64(),
        };

        self.stage = PipelineStage::Returned;
        obs::emit_run_finished(&rid, elapsed_ms(started), result.llm_judge_results.len(), true);
        Ok(result)
    }

    fn traditional_tier(&self, input: Option<&TraditionalInput>) -> Result<Metrics> {
        match input {
            None => Err(EvalError::empty("traditional tier input")),
            Some(TraditionalInput::Tasks(tasks)) => self.traditional.calculate(tasks),
            Some(TraditionalInput::Events {
                start_time,
                end_time,
                task_outcomes,
                coordination_events,
            }) => self.traditional.calculate_from_events(
                *start_time,
                *end_time,
                task_outcomes,
                coordination_events,
            ),
        }
    }

    fn enter(&mut self, run_id: &str, tier: Tier) -> Instant {
        self.stage = PipelineStage::Running(tier);
        obs::emit_tier_started(run_id, tier);
        Instant::now()
    }

    /// Pass a tier's value through, or record the failure and wrap the error
    /// with the tier.
    fn settle<T>(
        &mut self,
        run_id: &str,
        tier: Tier,
        outcome: Result<T>,
        run_started: Instant,
    ) -> Result<T> {
        match outcome {
            Ok(value) => Ok(value),
            Err(e) => {
                self.stage = PipelineStage::Failed(tier);
                COUNTERS.inc_tier_failures();
                obs::emit_tier_failed(run_id, tier, &e);
                obs::emit_run_finished(run_id, elapsed_ms(run_started), 0, false);
                debug!(tier = %tier, kind = ?e.kind(), "aborting run");
                Err(e.in_tier(tier))
            }
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
