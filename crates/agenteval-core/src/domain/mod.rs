//! Domain models for AgentEval.
//!
//! Canonical definitions for the records flowing through the tiers:
//! - `TaskResult`, `CoordinationEvent`, `AgentInteraction`: inputs
//! - `Review`, `ReviewPair`: judge inputs
//! - `Metrics`, `GraphMetrics`, `Evaluation`: tier outputs

pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod records;
pub mod review;

// Re-export main types and errors
pub use error::{ErrorKind, EvalError, Result, Tier};
pub use evaluation::{Evaluation, ScoreScale};
pub use metrics::{GraphMetrics, Metrics};
pub use records::{AgentInteraction, CoordinationEvent, TaskResult};
pub use review::{Review, ReviewPair};
