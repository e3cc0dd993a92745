//! Peer-review artifacts compared by the judge tier.

use serde::{Deserialize, Serialize};

use crate::domain::error::{EvalError, Result};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;
pub const MIN_CONFIDENCE: u8 = 1;
pub const MAX_CONFIDENCE: u8 = 5;

/// A review of one paper, written either by an agent or by a human reviewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub id: String,
    pub paper_id: String,
    /// Overall rating, 1–10.
    pub rating: u8,
    /// Reviewer confidence, 1–5.
    pub confidence: u8,
    pub review_text: String,
}

impl Review {
    pub fn new(
        id: impl Into<String>,
        paper_id: impl Into<String>,
        rating: u8,
        confidence: u8,
        review_text: impl Into<String>,
    ) -> Result<Self> {
        let review = Self {
            id: id.into(),
            paper_id: paper_id.into(),
            rating,
            confidence,
            review_text: review_text.into(),
        };
        review.validate()?;
        Ok(review)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EvalError::InvalidInput("review id must not be empty".to_string()));
        }
        if self.paper_id.trim().is_empty() {
            return Err(EvalError::InvalidInput(format!(
                "review {} has an empty paper_id",
                self.id
            )));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(EvalError::out_of_range(
                "rating",
                f64::from(self.rating),
                f64::from(MIN_RATING),
                f64::from(MAX_RATING),
            ));
        }
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&self.confidence) {
            return Err(EvalError::out_of_range(
                "confidence",
                f64::from(self.confidence),
                f64::from(MIN_CONFIDENCE),
                f64::from(MAX_CONFIDENCE),
            ));
        }
        Ok(())
    }
}

/// An agent review matched with the human baseline for the same paper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewPair {
    pub agent: Review,
    pub baseline: Review,
}

impl ReviewPair {
    pub fn new(agent: Review, baseline: Review) -> Self {
        Self { agent, baseline }
    }

    /// Validate both reviews of a prospective pair. Fails with
    /// [`EvalError::PaperMismatch`] when they are about different papers.
    pub fn check(agent: &Review, baseline: &Review) -> Result<()> {
        agent.validate()?;
        baseline.validate()?;
        if agent.paper_id != baseline.paper_id {
            return Err(EvalError::PaperMismatch {
                agent_paper_id: agent.paper_id.clone(),
                baseline_paper_id: baseline.paper_id.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_bounds() {
        assert!(Review::new("r1", "p1", 1, 1, "ok").is_ok());
        assert!(Review::new("r1", "p1", 10, 5, "ok").is_ok());
        assert!(Review::new("r1", "p1", 0, 3, "ok").is_err());
        assert!(Review::new("r1", "p1", 11, 3, "ok").is_err());
        assert!(Review::new("r1", "p1", 5, 6, "ok").is_err());
    }

    #[test]
    fn test_review_requires_ids() {
        let err = Review::new("", "p1", 5, 3, "text").unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput(_)));
        let err = Review::new("r1", " ", 5, 3, "text").unwrap_err();
        assert!(err.to_string().contains("paper_id"));
    }

    #[test]
    fn test_pair_paper_mismatch() {
        let agent = Review::new("a", "p1", 6, 3, "agent").unwrap();
        let baseline = Review::new("b", "p2", 7, 4, "human").unwrap();
        let err = ReviewPair::check(&agent, &baseline).unwrap_err();
        assert!(matches!(err, EvalError::PaperMismatch { .. }));

        let mut out_of_range = baseline.clone();
        out_of_range.paper_id = "p1".to_string();
        out_of_range.rating = 42;
        let err = ReviewPair::check(&agent, &out_of_range).unwrap_err();
        assert!(matches!(err, EvalError::OutOfRange { .. }));
    }
}
