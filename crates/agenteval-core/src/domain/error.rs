//! Domain-level error taxonomy for AgentEval.
//!
//! Every tier raises synchronously through [`EvalError`]. Context wrappers
//! ([`EvalError::PairFailed`], [`EvalError::TierFailed`]) carry the failing
//! input or tier; [`EvalError::kind`] sees through them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three evaluation tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Traditional,
    Graph,
    Judge,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Traditional => "traditional",
            Tier::Graph => "graph",
            Tier::Judge => "judge",
        };
        f.write_str(name)
    }
}

/// Coarse classification of an [`EvalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Range violations, negative durations, mismatched ids or batch lengths.
    InputValidation,
    /// A tier that requires data was handed none.
    EmptyInput,
    /// The judging capability returned an out-of-contract verdict.
    JudgeContractViolation,
    /// The judging capability itself failed (network, timeout, quota).
    ExternalCapability,
    /// Configuration, export, serialization and I/O failures.
    Internal,
}

/// AgentEval domain errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("negative duration: end {end} is earlier than start {start}")]
    NegativeDuration { start: String, end: String },

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("paper_id mismatch: agent review is for {agent_paper_id}, baseline is for {baseline_paper_id}")]
    PaperMismatch {
        agent_paper_id: String,
        baseline_paper_id: String,
    },

    #[error("mismatched batch lengths: {agent_reviews} agent reviews vs {baseline_reviews} baseline reviews")]
    BatchLengthMismatch {
        agent_reviews: usize,
        baseline_reviews: usize,
    },

    #[error("empty input: {what}")]
    EmptyInput { what: String },

    #[error("judge contract violation: {reason}")]
    JudgeContractViolation { reason: String },

    #[error("judge capability {model} failed: {reason}")]
    ExternalCapability { model: String, reason: String },

    #[error("judge call timed out after {timeout_ms} ms")]
    JudgeTimeout { timeout_ms: u64 },

    #[error("judge pair {index} (agent review {agent_review_id}) failed: {source}")]
    PairFailed {
        index: usize,
        agent_review_id: String,
        #[source]
        source: Box<EvalError>,
    },

    #[error("{tier} tier failed: {source}")]
    TierFailed {
        tier: Tier,
        #[source]
        source: Box<EvalError>,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    /// Shorthand for a validation failure on a bounded numeric field.
    pub fn out_of_range(field: &str, value: f64, min: f64, max: f64) -> Self {
        EvalError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        }
    }

    pub fn empty(what: &str) -> Self {
        EvalError::EmptyInput {
            what: what.to_string(),
        }
    }

    /// Classify this error, looking through pair/tier context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::InvalidInput(_)
            | EvalError::NegativeDuration { .. }
            | EvalError::OutOfRange { .. }
            | EvalError::PaperMismatch { .. }
            | EvalError::BatchLengthMismatch { .. } => ErrorKind::InputValidation,
            EvalError::EmptyInput { .. } => ErrorKind::EmptyInput,
            EvalError::JudgeContractViolation { .. } => ErrorKind::JudgeContractViolation,
            EvalError::ExternalCapability { .. } | EvalError::JudgeTimeout { .. } => {
                ErrorKind::ExternalCapability
            }
            EvalError::PairFailed { source, .. } | EvalError::TierFailed { source, .. } => {
                source.kind()
            }
            EvalError::Config(_)
            | EvalError::Export(_)
            | EvalError::Serialization(_)
            | EvalError::Io(_) => ErrorKind::Internal,
        }
    }

    /// Innermost error beneath any context wrappers.
    pub fn root(&self) -> &EvalError {
        match self {
            EvalError::PairFailed { source, .. } | EvalError::TierFailed { source, .. } => {
                source.root()
            }
            other => other,
        }
    }

    /// Tier that failed, when this error came out of the pipeline.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            EvalError::TierFailed { tier, .. } => Some(*tier),
            _ => None,
        }
    }

    pub(crate) fn in_tier(self, tier: Tier) -> Self {
        EvalError::TierFailed {
            tier,
            source: Box::new(self),
        }
    }
}

/// Result type for AgentEval operations.
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_mismatch_names_both_ids() {
        let err = EvalError::PaperMismatch {
            agent_paper_id: "paper-1".to_string(),
            baseline_paper_id: "paper-2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("paper-1"));
        assert!(msg.contains("paper-2"));
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }

    #[test]
    fn test_batch_length_mismatch_reports_both_lengths() {
        let err = EvalError::BatchLengthMismatch {
            agent_reviews: 1,
            baseline_reviews: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("1 agent reviews"));
        assert!(msg.contains("2 baseline reviews"));
    }

    #[test]
    fn test_kind_sees_through_wrappers() {
        let inner = EvalError::JudgeContractViolation {
            reason: "score 11 above 10".to_string(),
        };
        let pair = EvalError::PairFailed {
            index: 3,
            agent_review_id: "r-3".to_string(),
            source: Box::new(inner),
        };
        let err = pair.in_tier(Tier::Judge);

        assert_eq!(err.kind(), ErrorKind::JudgeContractViolation);
        assert_eq!(err.tier(), Some(Tier::Judge));
        assert!(matches!(
            err.root(),
            EvalError::JudgeContractViolation { .. }
        ));
        let msg = err.to_string();
        assert!(msg.contains("judge tier failed"));
        assert!(msg.contains("pair 3"));
    }

    #[test]
    fn test_timeout_is_external_capability() {
        let err = EvalError::JudgeTimeout { timeout_ms: 500 };
        assert_eq!(err.kind(), ErrorKind::ExternalCapability);
        assert!(err.to_string().contains("500 ms"));
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::Traditional.to_string(), "traditional");
        assert_eq!(Tier::Graph.to_string(), "graph");
        assert_eq!(Tier::Judge.to_string(), "judge");
    }
}
