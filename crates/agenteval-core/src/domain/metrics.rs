//! Tier outputs for the traditional and graph tiers.

use serde::{Deserialize, Serialize};

use crate::domain::error::{EvalError, Result};

/// Traditional execution/coordination metrics.
///
/// # Invariants
///
/// `success_rate` and `coordination_quality` lie in `[0, 1]`;
/// `execution_time_seconds` is finite and non-negative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    /// Mean task duration, or the run window for event input.
    pub execution_time_seconds: f64,
    pub success_rate: f64,
    pub coordination_quality: f64,
}

impl Metrics {
    pub fn new(
        execution_time_seconds: f64,
        success_rate: f64,
        coordination_quality: f64,
    ) -> Result<Self> {
        let metrics = Self {
            execution_time_seconds,
            success_rate,
            coordination_quality,
        };
        metrics.validate()?;
        Ok(metrics)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.execution_time_seconds.is_finite() || self.execution_time_seconds < 0.0 {
            return Err(EvalError::InvalidInput(format!(
                "execution_time_seconds must be finite and non-negative, got {}",
                self.execution_time_seconds
            )));
        }
        check_unit("success_rate", self.success_rate)?;
        check_unit("coordination_quality", self.coordination_quality)?;
        Ok(())
    }
}

/// Upper bound of the average degree centrality on a directed graph, where a
/// node counts both its in- and out-edges against `n - 1` possible peers.
pub const MAX_DIRECTED_DEGREE_CENTRALITY: f64 = 2.0;

/// Structural complexity metrics of an interaction graph.
///
/// All metric fields are `0.0` for an empty graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GraphMetrics {
    pub density: f64,
    pub avg_degree_centrality: f64,
    pub avg_betweenness_centrality: f64,
    pub avg_clustering_coefficient: f64,
    pub num_nodes: usize,
    pub num_edges: usize,
}

impl GraphMetrics {
    pub fn validate(&self) -> Result<()> {
        check_unit("density", self.density)?;
        check_range(
            "avg_degree_centrality",
            self.avg_degree_centrality,
            0.0,
            MAX_DIRECTED_DEGREE_CENTRALITY,
        )?;
        check_unit("avg_betweenness_centrality", self.avg_betweenness_centrality)?;
        check_unit("avg_clustering_coefficient", self.avg_clustering_coefficient)?;
        Ok(())
    }
}

fn check_unit(field: &str, value: f64) -> Result<()> {
    check_range(field, value, 0.0, 1.0)
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    // NaN fails `contains`, so it is rejected here too.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EvalError::out_of_range(field, value, min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_accepts_bounds() {
        assert!(Metrics::new(0.0, 0.0, 0.0).is_ok());
        assert!(Metrics::new(12.5, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_metrics_rejects_out_of_range_rates() {
        let err = Metrics::new(1.0, 1.5, 0.5).unwrap_err();
        assert!(err.to_string().contains("success_rate"));
        let err = Metrics::new(1.0, 0.5, -0.1).unwrap_err();
        assert!(err.to_string().contains("coordination_quality"));
        assert!(Metrics::new(1.0, f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_metrics_rejects_negative_time() {
        assert!(Metrics::new(-1.0, 0.5, 0.5).is_err());
    }

    #[test]
    fn test_graph_metrics_default_is_zeroed() {
        let m = GraphMetrics::default();
        assert_eq!(m.density, 0.0);
        assert_eq!(m.avg_degree_centrality, 0.0);
        assert_eq!(m.avg_betweenness_centrality, 0.0);
        assert_eq!(m.avg_clustering_coefficient, 0.0);
        assert_eq!(m.num_nodes, 0);
        assert_eq!(m.num_edges, 0);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_graph_metrics_serde_field_names() {
        let v = serde_json::to_value(GraphMetrics::default()).expect("to_value");
        let obj = v.as_object().expect("object");
        for key in [
            "density",
            "avg_degree_centrality",
            "avg_betweenness_centrality",
            "avg_clustering_coefficient",
            "num_nodes",
            "num_edges",
        ] {
            assert!(obj.contains_key(key), "missing key: {key}");
        }
    }
}
