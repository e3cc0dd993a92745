//! In-process judges for offline runs and tests.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::error::{EvalError, Result};
use crate::domain::review::{Review, MAX_RATING, MIN_RATING};
use crate::judge::model::{JudgeModel, JudgeRequest, JudgeVerdict};

const TEXT_WEIGHT: f64 = 0.8;
const RATING_WEIGHT: f64 = 0.2;

// ---------------------------------------------------------------------------
// DeterministicJudge
// ---------------------------------------------------------------------------

/// Scores a pair from its texts and ratings alone.
///
/// `score = max * (0.8 * jaccard(tokens) + 0.2 * rating_agreement)`, where
/// tokens are lower-cased alphanumeric words and rating agreement is
/// `1 - |Δrating| / 9`. The sampling seed is ignored, so equal inputs give
/// equal outputs.
#[derive(Debug, Clone)]
pub struct DeterministicJudge {
    model_id: String,
}

impl Default for DeterministicJudge {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicJudge {
    pub fn new() -> Self {
        Self {
            model_id: "deterministic-overlap".to_string(),
        }
    }
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn rating_agreement(agent: &Review, baseline: &Review) -> f64 {
    let span = f64::from(MAX_RATING - MIN_RATING);
    let diff = (f64::from(agent.rating) - f64::from(baseline.rating)).abs();
    (1.0 - diff / span).clamp(0.0, 1.0)
}

#[async_trait]
impl JudgeModel for DeterministicJudge {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeVerdict> {
        let agent_tokens = tokens(&request.agent.review_text);
        let baseline_tokens = tokens(&request.baseline.review_text);
        let overlap = jaccard(&agent_tokens, &baseline_tokens);
        let agreement = rating_agreement(&request.agent, &request.baseline);
        let similarity = TEXT_WEIGHT * overlap + RATING_WEIGHT * agreement;
        let score = (request.score_scale.max() * similarity).clamp(0.0, request.score_scale.max());

        let shared = agent_tokens.intersection(&baseline_tokens).count();
        let justification = format!(
            "term overlap {overlap:.3} ({shared} shared terms), rating {} vs {} (agreement {agreement:.3}), judged on {} criteria",
            request.agent.rating,
            request.baseline.rating,
            request.criteria.len(),
        );
        Ok(JudgeVerdict::new(score, justification))
    }
}

// ---------------------------------------------------------------------------
// ScriptedJudge
// ---------------------------------------------------------------------------

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Verdict(JudgeVerdict),
    /// Fail with [`EvalError::ExternalCapability`].
    Fail(String),
    /// Sleep, then answer with a mid-scale verdict.
    Stall(Duration),
}

/// Replays a fixed script and records every request it receives.
///
/// Call `i` gets `responses[i]`; once the script runs out the last entry
/// repeats.
#[derive(Debug)]
pub struct ScriptedJudge {
    model_id: String,
    responses: Vec<ScriptedResponse>,
    requests: Mutex<Vec<JudgeRequest>>,
}

impl ScriptedJudge {
    pub fn sequence(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            model_id: "scripted".to_string(),
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(score: f64, justification: impl Into<String>) -> Self {
        Self::sequence(vec![ScriptedResponse::Verdict(JudgeVerdict::new(
            score,
            justification,
        ))])
    }

    pub fn with_model_id(mut self, id: impl Into<String>) -> Self {
        self.model_id = id.into();
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<JudgeRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, request: &JudgeRequest) -> usize {
        match self.requests.lock() {
            Ok(mut guard) => {
                guard.push(request.clone());
                guard.len() - 1
            }
            Err(_) => 0,
        }
    }
}

#[async_trait]
impl JudgeModel for ScriptedJudge {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeVerdict> {
        let call = self.record(request);
        let response = self
            .responses
            .get(call)
            .or_else(|| self.responses.last())
            .cloned()
            .ok_or_else(|| EvalError::ExternalCapability {
                model: self.model_id.clone(),
                reason: "script is empty".to_string(),
            })?;

        match response {
            ScriptedResponse::Verdict(v) => Ok(v),
            ScriptedResponse::Fail(reason) => Err(EvalError::ExternalCapability {
                model: self.model_id.clone(),
                reason,
            }),
            ScriptedResponse::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok(JudgeVerdict::new(
                    request.score_scale.max() / 2.0,
                    "answered after delay",
                ))
            }
        }
    }
}
