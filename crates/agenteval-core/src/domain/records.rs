//! Input records produced by the system under evaluation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{EvalError, Result};

/// One completed unit of agent work.
///
/// # Invariants
///
/// `end_time >= start_time` and `coordination_score` lies in `[0, 1]`.
/// [`TaskResult::new`] enforces both; records deserialised from JSON must be
/// passed through [`TaskResult::validate`] before use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResult {
    /// Identifier of the task within the run.
    pub task_id: String,
    /// Agent that executed the task.
    pub agent_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Whether the task reached its goal.
    pub success: bool,
    /// Quality of the agent's coordination on this task, in `[0, 1]`.
    pub coordination_score: f64,
}

impl TaskResult {
    pub fn new(
        task_id: impl Into<String>,
        agent_id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        success: bool,
        coordination_score: f64,
    ) -> Result<Self> {
        let result = Self {
            task_id: task_id.into(),
            agent_id: agent_id.into(),
            start_time,
            end_time,
            success,
            coordination_score,
        };
        result.validate()?;
        Ok(result)
    }

    /// Re-check the construction invariants.
    pub fn validate(&self) -> Result<()> {
        if self.end_time < self.start_time {
            return Err(EvalError::NegativeDuration {
                start: self.start_time.to_rfc3339(),
                end: self.end_time.to_rfc3339(),
            });
        }
        if !(0.0..=1.0).contains(&self.coordination_score) {
            return Err(EvalError::out_of_range(
                "coordination_score",
                self.coordination_score,
                0.0,
                1.0,
            ));
        }
        Ok(())
    }

    /// Wall-clock duration of the task in seconds, at nanosecond precision.
    pub fn execution_time_seconds(&self) -> Result<f64> {
        seconds_between(self.start_time, self.end_time)
    }
}

/// Elapsed seconds from `start` to `end`. Fails with
/// [`EvalError::NegativeDuration`] when `end` precedes `start`.
pub fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64> {
    (end - start)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .map_err(|_| EvalError::NegativeDuration {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        })
}

/// A discrete coordination action and whether it succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoordinationEvent {
    pub agent_id: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

impl CoordinationEvent {
    pub fn new(agent_id: impl Into<String>, timestamp: DateTime<Utc>, success: bool) -> Self {
        Self {
            agent_id: agent_id.into(),
            timestamp,
            success,
        }
    }
}

/// A directed message or hand-off between two agents.
///
/// `from_agent == to_agent` is legal and records a self-check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentInteraction {
    /// Sending agent; becomes the edge source.
    pub from_agent: String,
    /// Receiving agent; may equal `from_agent`.
    pub to_agent: String,
    /// Free-form kind, e.g. `delegate` or `feedback`.
    pub interaction_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl AgentInteraction {
    pub fn new(
        from_agent: impl Into<String>,
        to_agent: impl Into<String>,
        interaction_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            from_agent: from_agent.into(),
            to_agent: to_agent.into(),
            interaction_type: interaction_type.into(),
            timestamp,
            metadata: None,
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn is_self_interaction(&self) -> bool {
        self.from_agent == self.to_agent
    }
}
