//! The judging capability seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::domain::evaluation::ScoreScale;
use crate::domain::review::Review;

/// Everything a judge sees for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeRequest {
    pub agent: Review,
    pub baseline: Review,
    /// Qualitative dimensions, in presentation order.
    pub criteria: Vec<String>,
    pub score_scale: ScoreScale,
    /// Seed for any sampling the capability performs. Deterministic judges
    /// ignore it.
    pub sampling_seed: u64,
}

/// Raw answer from a judge, before contract checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub score: f64,
    pub justification: String,
}

impl JudgeVerdict {
    pub fn new(score: f64, justification: impl Into<String>) -> Self {
        Self {
            score,
            justification: justification.into(),
        }
    }
}

/// A language-model (or stand-in) that scores an agent review against a
/// baseline review.
///
/// Implementations return `{score, justification}` and nothing else; bounds
/// are checked by [`SemanticJudge`](crate::judge::SemanticJudge), never by
/// the capability. Failures of the capability itself should be reported as
/// [`EvalError::ExternalCapability`](crate::EvalError::ExternalCapability).
/// Retries, if any, belong here rather than in the caller.
#[async_trait]
pub trait JudgeModel: Send + Sync {
    /// Identifier recorded in logs and the run snapshot.
    fn model_id(&self) -> &str;

    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeVerdict>;
}
