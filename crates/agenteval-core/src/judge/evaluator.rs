//! `SemanticJudge`: validates review pairs, calls the capability, and holds
//! it to the score contract.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, instrument};

use crate::config::JudgeConfig;
use crate::counters::COUNTERS;
use crate::domain::error::{EvalError, Result};
use crate::domain::evaluation::{Evaluation, ScoreScale};
use crate::domain::review::{Review, ReviewPair};
use crate::judge::model::{JudgeModel, JudgeRequest, JudgeVerdict};
use crate::obs;

/// Judge-tier evaluator.
///
/// Holds no per-call state: with a deterministic capability, `evaluate` is
/// a pure function of its inputs. Safe to share across tasks.
#[derive(Clone)]
pub struct SemanticJudge {
    model: Arc<dyn JudgeModel>,
    score_scale: ScoreScale,
    criteria: Vec<String>,
    timeout: Option<Duration>,
    max_concurrency: usize,
}

impl std::fmt::Debug for SemanticJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticJudge")
            .field("model", &self.model.model_id())
            .field("score_scale", &self.score_scale)
            .field("criteria", &self.criteria)
            .field("timeout", &self.timeout)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl SemanticJudge {
    /// Judge with default settings: 0–10 scale, default criteria, no
    /// timeout, sequential batches.
    pub fn new(model: Arc<dyn JudgeModel>) -> Self {
        Self::from_config(model, &JudgeConfig::default()).with_timeout(None)
    }

    pub fn from_config(model: Arc<dyn JudgeModel>, config: &JudgeConfig) -> Self {
        Self {
            model,
            score_scale: config.score_scale,
            criteria: config.effective_criteria(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    pub fn with_score_scale(mut self, scale: ScoreScale) -> Self {
        self.score_scale = scale;
        self
    }

    pub fn with_criteria(mut self, criteria: Vec<String>) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    pub fn score_scale(&self) -> ScoreScale {
        self.score_scale
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    /// Score one agent review against its baseline with sampling seed `0`.
    pub async fn evaluate(
        &self,
        agent: &Review,
        baseline: &Review,
        criteria: Option<&[String]>,
    ) -> Result<Evaluation> {
        self.evaluate_with_seed(agent, baseline, criteria, 0).await
    }

    pub async fn evaluate_with_seed(
        &self,
        agent: &Review,
        baseline: &Review,
        criteria: Option<&[String]>,
        sampling_seed: u64,
    ) -> Result<Evaluation> {
        ReviewPair::check(agent, baseline)?;
        let criteria = criteria.unwrap_or(self.criteria.as_slice());
        self.invoke(agent, baseline, criteria, sampling_seed).await
    }

    /// Score `agent_reviews[i]` against `baseline_reviews[i]` for every `i`.
    ///
    /// Lengths must match; two empty slices give an empty result. Every pair
    /// is checked before the capability is called once. Output order is
    /// input order.
    pub async fn batch_evaluate(
        &self,
        agent_reviews: &[Review],
        baseline_reviews: &[Review],
        criteria: Option<&[String]>,
    ) -> Result<Vec<Evaluation>> {
        self.batch_evaluate_with_seed(agent_reviews, baseline_reviews, criteria, 0)
            .await
    }

    /// As [`batch_evaluate`](Self::batch_evaluate); pair `i` is judged with
    /// sampling seed `base_seed.wrapping_add(i)`.
    #[instrument(skip_all, fields(model = %self.model.model_id(), pairs = agent_reviews.len()))]
    pub async fn batch_evaluate_with_seed(
        &self,
        agent_reviews: &[Review],
        baseline_reviews: &[Review],
        criteria: Option<&[String]>,
        base_seed: u64,
    ) -> Result<Vec<Evaluation>> {
        if agent_reviews.len() != baseline_reviews.len() {
            return Err(EvalError::BatchLengthMismatch {
                agent_reviews: agent_reviews.len(),
                baseline_reviews: baseline_reviews.len(),
            });
        }
        if agent_reviews.is_empty() {
            return Ok(Vec::new());
        }
        for (index, (agent, baseline)) in agent_reviews.iter().zip(baseline_reviews).enumerate() {
            ReviewPair::check(agent, baseline).map_err(|e| pair_failed(index, agent, e))?;
        }

        let criteria = criteria.unwrap_or(self.criteria.as_slice());
        let evaluations: Vec<Evaluation> =
            stream::iter(0..agent_reviews.len())
                .map(|index| {
                    let agent = &agent_reviews[index];
                    let baseline = &baseline_reviews[index];
                    async move {
                        let seed = base_seed.wrapping_add(index as u64);
                        self.invoke(agent, baseline, criteria, seed)
                            .await
                            .map_err(|e| pair_failed(index, agent, e))
                    }
                })
                .buffered(self.max_concurrency)
                .try_collect()
                .await?;

        debug!(evaluations = evaluations.len(), "judge batch complete");
        Ok(evaluations)
    }

    /// Batch form over already-paired reviews.
    pub async fn evaluate_pairs(
        &self,
        pairs: &[ReviewPair],
        criteria: Option<&[String]>,
        base_seed: u64,
    ) -> Result<Vec<Evaluation>> {
        let (agents, baselines): (Vec<Review>, Vec<Review>) = pairs
            .iter()
            .map(|p| (p.agent.clone(), p.baseline.clone()))
            .unzip();
        self.batch_evaluate_with_seed(&agents, &baselines, criteria, base_seed)
            .await
    }

    async fn invoke(
        &self,
        agent: &Review,
        baseline: &Review,
        criteria: &[String],
        sampling_seed: u64,
    ) -> Result<Evaluation> {
        let request = JudgeRequest {
            agent: agent.clone(),
            baseline: baseline.clone(),
            criteria: criteria.to_vec(),
            score_scale: self.score_scale,
            sampling_seed,
        };

        COUNTERS.inc_judge_calls();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.model.judge(&request)).await {
                Ok(verdict) => verdict,
                Err(_) => Err(EvalError::JudgeTimeout {
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
            None => self.model.judge(&request).await,
        };
        let verdict = match outcome.and_then(|v| self.check_verdict(v)) {
            Ok(v) => v,
            Err(e) => {
                COUNTERS.inc_judge_failures();
                return Err(e);
            }
        };

        let evaluation = Evaluation::new(
            agent.id.clone(),
            baseline.id.clone(),
            agent.paper_id.clone(),
            verdict.score,
            self.score_scale,
            verdict.justification,
        )?;
        obs::emit_judge_pair_evaluated(self.model.model_id(), &agent.id, evaluation.score);
        Ok(evaluation)
    }

    fn check_verdict(&self, verdict: JudgeVerdict) -> Result<JudgeVerdict> {
        if !self.score_scale.contains(verdict.score) {
            return Err(EvalError::JudgeContractViolation {
                reason: format!(
                    "score {} outside [0, {}]",
                    verdict.score,
                    self.score_scale.max()
                ),
            });
        }
        if verdict.justification.trim().is_empty() {
            return Err(EvalError::JudgeContractViolation {
                reason: "empty justification".to_string(),
            });
        }
        Ok(verdict)
    }
}

fn pair_failed(index: usize, agent: &Review, source: EvalError) -> EvalError {
    EvalError::PairFailed {
        index,
        agent_review_id: agent.id.clone(),
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::judge::fakes::{DeterministicJudge, ScriptedJudge, ScriptedResponse};

    fn review(id: &str, paper: &str, text: &str) -> Review {
        Review::new(id, paper, 6, 3, text).unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_wraps_verdict() {
        let judge = SemanticJudge::new(Arc::new(ScriptedJudge::always(7.0, "close match")));
        let e = judge
            .evaluate(&review("a1", "p1", "x"), &review("b1", "p1", "y"), None)
            .await
            .unwrap();
        assert_eq!(e.score, 7.0);
        assert_eq!(e.paper_id, "p1");
        assert_eq!(e.agent_review_id, "a1");
        assert_eq!(e.baseline_review_id, "b1");
        assert_eq!(e.score_scale, ScoreScale::Ten);
    }

    #[tokio::test]
    async fn test_paper_mismatch_skips_capability() {
        let spy = Arc::new(ScriptedJudge::always(5.0, "ok"));
        let judge = SemanticJudge::new(spy.clone());
        let err = judge
            .evaluate(&review("a1", "p1", "x"), &review("b1", "p2", "y"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::PaperMismatch { .. }));
        assert_eq!(spy.call_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_is_contract_violation() {
        let judge = SemanticJudge::new(Arc::new(ScriptedJudge::always(0.9, "ok")))
            .with_score_scale(ScoreScale::Ten);
        assert!(judge
            .evaluate(&review("a", "p", "x"), &review("b", "p", "y"), None)
            .await
            .is_ok());

        let judge = SemanticJudge::new(Arc::new(ScriptedJudge::always(1.5, "ok")))
            .with_score_scale(ScoreScale::Unit);
        let err = judge
            .evaluate(&review("a", "p", "x"), &review("b", "p", "y"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::JudgeContractViolation);
    }

    #[tokio::test]
    async fn test_empty_justification_is_contract_violation() {
        let judge = SemanticJudge::new(Arc::new(ScriptedJudge::always(5.0, "   ")));
        let err = judge
            .evaluate(&review("a", "p", "x"), &review("b", "p", "y"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::JudgeContractViolation { .. }));
    }

    #[tokio::test]
    async fn test_criteria_override_reaches_capability() {
        let spy = Arc::new(ScriptedJudge::always(5.0, "ok"));
        let judge = SemanticJudge::new(spy.clone());
        let custom = vec!["novelty".to_string()];
        judge
            .evaluate(&review("a", "p", "x"), &review("b", "p", "y"), Some(&custom))
            .await
            .unwrap();
        assert_eq!(spy.requests()[0].criteria, custom);
    }

    #[tokio::test]
    async fn test_batch_seeds_follow_index() {
        let spy = Arc::new(ScriptedJudge::always(5.0, "ok"));
        let judge = SemanticJudge::new(spy.clone());
        let agents = vec![review("a1", "p1", "x"), review("a2", "p2", "x")];
        let baselines = vec![review("b1", "p1", "y"), review("b2", "p2", "y")];
        judge
            .batch_evaluate_with_seed(&agents, &baselines, None, u64::MAX)
            .await
            .unwrap();
        let seeds: Vec<u64> = spy.requests().iter().map(|r| r.sampling_seed).collect();
        assert_eq!(seeds, vec![u64::MAX, 0]);
    }

    #[tokio::test]
    async fn test_concurrent_batch_preserves_order() {
        let judge = SemanticJudge::new(Arc::new(DeterministicJudge::new())).with_max_concurrency(4);
        let agents: Vec<Review> = (0..6)
            .map(|i| review(&format!("a{i}"), &format!("p{i}"), "method results"))
            .collect();
        let baselines: Vec<Review> = (0..6)
            .map(|i| review(&format!("b{i}"), &format!("p{i}"), "method novelty"))
            .collect();
        let out = judge.batch_evaluate(&agents, &baselines, None).await.unwrap();
        let ids: Vec<&str> = out.iter().map(|e| e.agent_review_id.as_str()).collect();
        assert_eq!(ids, vec!["a0", "a1", "a2", "a3", "a4", "a5"]);
    }

    #[tokio::test]
    async fn test_failing_pair_is_identified() {
        let judge = SemanticJudge::new(Arc::new(ScriptedJudge::sequence(vec![
            ScriptedResponse::Verdict(JudgeVerdict::new(5.0, "ok")),
            ScriptedResponse::Fail("quota exceeded".to_string()),
        ])));
        let agents = vec![review("a1", "p1", "x"), review("a2", "p2", "x")];
        let baselines = vec![review("b1", "p1", "y"), review("b2", "p2", "y")];
        let err = judge
            .batch_evaluate(&agents, &baselines, None)
            .await
            .unwrap_err();
        match &err {
            EvalError::PairFailed {
                index,
                agent_review_id,
                ..
            } => {
                assert_eq!(*index, 1);
                assert_eq!(agent_review_id, "a2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::ExternalCapability);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_propagates() {
        let judge = SemanticJudge::new(Arc::new(ScriptedJudge::sequence(vec![
            ScriptedResponse::Stall(Duration::from_secs(30)),
        ])))
        .with_timeout(Some(Duration::from_millis(250)));
        let err = judge
            .evaluate(&review("a", "p", "x"), &review("b", "p", "y"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::JudgeTimeout { timeout_ms: 250 }));
    }
}
