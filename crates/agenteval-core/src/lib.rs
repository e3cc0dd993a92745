//! AgentEval Core Library
//!
//! Three-tier evaluation of multi-agent runs: traditional execution metrics,
//! an LLM judge comparing agent reviews with human baselines, and graph
//! complexity of inter-agent communication, orchestrated by
//! [`EvaluationPipeline`].

pub mod config;
pub mod counters;
pub mod domain;
pub mod graph;
pub mod judge;
pub mod obs;
pub mod pipeline;
pub mod report;
pub mod telemetry;
pub mod traditional;

pub use config::{
    load_config, GraphConfig, JudgeConfig, ObservabilityConfig, PipelineConfig, TierToggles,
    DEFAULT_CRITERIA,
};

pub use domain::{
    AgentInteraction, CoordinationEvent, ErrorKind, EvalError, Evaluation, GraphMetrics, Metrics,
    Result, Review, ReviewPair, ScoreScale, TaskResult, Tier,
};

pub use traditional::{
    calculate_coordination_quality, calculate_duration, calculate_execution_time,
    calculate_success_rate, TraditionalMetricsEvaluator,
};

pub use graph::{
    betweenness_centrality, clustering, degree_centrality, write_graph_export,
    CoordinationPatterns, GraphComplexityAnalyzer, GraphExport, GraphExportFormat,
    InteractionEdge, InteractionGraph,
};

pub use judge::{
    DeterministicJudge, HttpJudge, JudgeModel, JudgeRequest, JudgeVerdict, ScriptedJudge,
    ScriptedResponse, SemanticJudge,
};

pub use pipeline::{
    ConfigSnapshot, EvaluationPipeline, JudgeStatus, PipelineInput, PipelineResult,
    PipelineStage, TraditionalInput,
};

pub use report::{write_report_json, ConsolidatedReport, JudgeSummaryArtifact};

pub use counters::COUNTERS;
pub use obs::{
    emit_judge_pair_evaluated, emit_run_finished, emit_run_started, emit_tier_failed,
    emit_tier_finished, emit_tier_skipped, emit_tier_started, RunSpan,
};
pub use telemetry::{init_from_config, init_tracing, LogSettings};

/// AgentEval version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
