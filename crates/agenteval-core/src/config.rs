//! Evaluation configuration.
//!
//! Loaded from JSON by the surrounding layer; every section has defaults so
//! a partial document is enough:
//!
//! ```json
//! { "seed": 42, "judge": { "model": "gpt-4o-mini", "score_scale": "unit" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::error::{EvalError, Result};
use crate::domain::evaluation::ScoreScale;

/// Criteria used when the caller supplies none. Order is significant: it is
/// the order in which they are presented to the judge.
pub const DEFAULT_CRITERIA: &[&str] = &[
    "Accuracy and relevance of assessment",
    "Clarity and coherence of feedback",
    "Depth and thoroughness of analysis",
    "Balance of strengths and weaknesses",
    "Constructiveness of suggestions",
];

pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4o-mini";

/// Which tiers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierToggles {
    pub traditional: bool,
    pub graph: bool,
    pub judge: bool,
}

impl Default for TierToggles {
    fn default() -> Self {
        Self {
            traditional: true,
            graph: true,
            judge: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Model identifier handed to the judging capability.
    pub model: String,
    pub score_scale: ScoreScale,
    /// Overrides [`DEFAULT_CRITERIA`] when set.
    pub criteria: Option<Vec<String>>,
    /// Per-call timeout; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Upper bound on in-flight judge calls during a batch. `1` is sequential.
    pub max_concurrency: usize,
    /// OpenAI-compatible base URL for the hosted judge.
    pub endpoint: String,
    /// Environment variable holding the API key for the hosted judge.
    pub api_key_env: String,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_JUDGE_MODEL.to_string(),
            score_scale: ScoreScale::default(),
            criteria: None,
            timeout_secs: Some(60),
            max_concurrency: 1,
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl JudgeConfig {
    /// Criteria in effect: the configured list, or the defaults.
    pub fn effective_criteria(&self) -> Vec<String> {
        match &self.criteria {
            Some(list) => list.clone(),
            None => DEFAULT_CRITERIA.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Thresholds for coordination-pattern detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// A node is a hub when its degree centrality exceeds this multiple of
    /// the graph mean.
    pub hub_ratio: f64,
    /// A node is a bridge when its betweenness centrality exceeds this.
    pub bridge_threshold: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            hub_ratio: 1.5,
            bridge_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default level when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit newline-delimited JSON log lines.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seed for the pipeline-owned RNG. Drawn from OS entropy when absent.
    pub seed: Option<u64>,
    pub tiers: TierToggles,
    pub judge: JudgeConfig,
    pub graph: GraphConfig,
    pub observability: ObservabilityConfig,
}

impl PipelineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tiers(mut self, tiers: TierToggles) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn with_judge(mut self, judge: JudgeConfig) -> Self {
        self.judge = judge;
        self
    }

    pub fn with_graph(mut self, graph: GraphConfig) -> Self {
        self.graph = graph;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.judge.model.trim().is_empty() {
            return Err(EvalError::Config("judge.model must not be empty".to_string()));
        }
        if self.judge.max_concurrency == 0 {
            return Err(EvalError::Config(
                "judge.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.judge.timeout_secs == Some(0) {
            return Err(EvalError::Config(
                "judge.timeout_secs must be positive when set".to_string(),
            ));
        }
        if let Some(criteria) = &self.judge.criteria {
            if criteria.is_empty() || criteria.iter().any(|c| c.trim().is_empty()) {
                return Err(EvalError::Config(
                    "judge.criteria must be a non-empty list of non-empty strings".to_string(),
                ));
            }
        }
        if !(self.graph.hub_ratio.is_finite() && self.graph.hub_ratio > 0.0) {
            return Err(EvalError::Config(format!(
                "graph.hub_ratio must be positive, got {}",
                self.graph.hub_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.graph.bridge_threshold) {
            return Err(EvalError::Config(format!(
                "graph.bridge_threshold must be within [0, 1], got {}",
                self.graph.bridge_threshold
            )));
        }
        Ok(())
    }

    /// SHA-256 hex digest of the serialised configuration.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Read and validate a JSON configuration file.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        return Err(EvalError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let config: PipelineConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
