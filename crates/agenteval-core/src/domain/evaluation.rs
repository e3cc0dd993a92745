//! Judge-tier output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{EvalError, Result};

/// Score scale declared for a judge deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// Scores in `[0, 1]`.
    Unit,
    /// Scores in `[0, 10]`.
    #[default]
    Ten,
}

impl ScoreScale {
    pub fn max(self) -> f64 {
        match self {
            ScoreScale::Unit => 1.0,
            ScoreScale::Ten => 10.0,
        }
    }

    pub fn contains(self, score: f64) -> bool {
        (0.0..=self.max()).contains(&score)
    }
}

/// Semantic comparison of one agent review against one baseline review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    /// Unique per evaluation; never derived from the seed.
    pub evaluation_id: Uuid,
    pub agent_review_id: String,
    pub baseline_review_id: String,
    /// Paper both reviews address.
    pub paper_id: String,
    /// Similarity score on `score_scale`.
    pub score: f64,
    /// Scale the score was validated against.
    pub score_scale: ScoreScale,
    /// Judge's reasoning; never empty.
    pub justification: String,
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    /// Build an evaluation, enforcing the score bound and a non-empty
    /// justification.
    pub fn new(
        agent_review_id: impl Into<String>,
        baseline_review_id: impl Into<String>,
        paper_id: impl Into<String>,
        score: f64,
        score_scale: ScoreScale,
        justification: impl Into<String>,
    ) -> Result<Self> {
        let justification = justification.into();
        if !score_scale.contains(score) {
            return Err(EvalError::out_of_range("score", score, 0.0, score_scale.max()));
        }
        if justification.trim().is_empty() {
            return Err(EvalError::InvalidInput(
                "evaluation justification must not be empty".to_string(),
            ));
        }
        Ok(Self {
            evaluation_id: Uuid::new_v4(),
            agent_review_id: agent_review_id.into(),
            baseline_review_id: baseline_review_id.into(),
            paper_id: paper_id.into(),
            score,
            score_scale,
            justification,
            evaluated_at: Utc::now(),
        })
    }

    /// Score mapped onto `[0, 1]` regardless of the declared scale.
    pub fn normalized_score(&self) -> f64 {
        self.score / self.score_scale.max()
    }
}
