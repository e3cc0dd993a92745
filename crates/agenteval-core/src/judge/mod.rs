//! Judge tier: semantic comparison of agent reviews with human baselines.
//!
//! [`JudgeModel`] is the only seam to the outside world. [`SemanticJudge`]
//! checks inputs before calling it and checks its answers after.

pub mod evaluator;
pub mod fakes;
pub mod http;
pub mod model;

pub use crate::config::DEFAULT_CRITERIA;
pub use evaluator::SemanticJudge;
pub use fakes::{DeterministicJudge, ScriptedJudge, ScriptedResponse};
pub use http::HttpJudge;
pub use model::{JudgeModel, JudgeRequest, JudgeVerdict};
