//! Graph-theoretic complexity of inter-agent communication.
//!
//! # Module layout
//!
//! - [`model`]: `InteractionGraph`, `InteractionEdge`
//! - [`centrality`]: degree and betweenness centrality
//! - [`clustering`]: local clustering on the undirected simplification
//! - [`patterns`]: `CoordinationPatterns` (hubs, bridges, isolated agents)
//! - [`export`]: node-link JSON and GraphML
//!
//! Every metric handles the empty graph by returning `0.0` or an empty map.

pub mod centrality;
pub mod clustering;
pub mod export;
pub mod model;
pub mod patterns;

use tracing::debug;

use crate::config::GraphConfig;
use crate::domain::error::Result;
use crate::domain::metrics::GraphMetrics;
use crate::domain::records::AgentInteraction;

pub use centrality::{betweenness_centrality, degree_centrality};
pub use clustering::clustering;
pub use export::{write_graph_export, GraphExport, GraphExportFormat};
pub use model::{InteractionEdge, InteractionGraph};
pub use patterns::CoordinationPatterns;

/// Analyzer for the graph tier. Holds only its thresholds; each call builds
/// and drops its own graph.
#[derive(Debug, Clone, Default)]
pub struct GraphComplexityAnalyzer {
    config: GraphConfig,
}

impl GraphComplexityAnalyzer {
    /// Analyzer with the given hub and bridge thresholds.
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Collapse interactions into a weighted directed graph. Repeated
    /// `(from, to)` pairs raise the edge weight; self-interactions still
    /// register their node.
    pub fn build_graph(&self, interactions: &[AgentInteraction]) -> InteractionGraph {
        InteractionGraph::from_interactions(interactions)
    }

    /// Build the graph and compute every metric. Empty input yields
    /// zero-valued metrics.
    pub fn analyze(&self, interactions: &[AgentInteraction]) -> Result<GraphMetrics> {
        let graph = self.build_graph(interactions);
        self.analyze_graph(&graph)
    }

    pub fn analyze_graph(&self, graph: &InteractionGraph) -> Result<GraphMetrics> {
        let metrics = GraphMetrics {
            density: self.calculate_density(graph),
            avg_degree_centrality: self.calculate_degree_centrality(graph),
            avg_betweenness_centrality: self.calculate_betweenness_centrality(graph),
            avg_clustering_coefficient: self.calculate_clustering_coefficient(graph),
            num_nodes: graph.node_count(),
            num_edges: graph.edge_count(),
        };
        metrics.validate()?;
        debug!(
            nodes = metrics.num_nodes,
            edges = metrics.num_edges,
            density = metrics.density,
            "graph metrics calculated"
        );
        Ok(metrics)
    }

    /// Distinct edges between different agents over `n(n - 1)`.
    /// `0.0` when `n <= 1`.
    pub fn calculate_density(&self, graph: &InteractionGraph) -> f64 {
        let n = graph.node_count();
        if n <= 1 {
            return 0.0;
        }
        graph.proper_edge_count() as f64 / (n * (n - 1)) as f64
    }

    /// Mean degree centrality.
    pub fn calculate_degree_centrality(&self, graph: &InteractionGraph) -> f64 {
        centrality::mean(&centrality::degree_scores(graph))
    }

    /// Mean betweenness centrality.
    pub fn calculate_betweenness_centrality(&self, graph: &InteractionGraph) -> f64 {
        centrality::mean(&centrality::betweenness_scores(graph))
    }

    /// Mean local clustering coefficient on the undirected simplification.
    pub fn calculate_clustering_coefficient(&self, graph: &InteractionGraph) -> f64 {
        centrality::mean(&clustering::clustering_scores(graph))
    }

    pub fn identify_coordination_patterns(&self, graph: &InteractionGraph) -> CoordinationPatterns {
        patterns::identify(graph, &self.config)
    }

    pub fn export_to_json(&self, graph: &InteractionGraph) -> Result<String> {
        export::to_json(graph)
    }

    pub fn export_to_graphml(&self, graph: &InteractionGraph) -> Result<String> {
        export::to_graphml(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn interactions(edges: &[(&str, &str)]) -> Vec<AgentInteraction> {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        edges
            .iter()
            .map(|(a, b)| AgentInteraction::new(*a, *b, "msg", ts))
            .collect()
    }

    #[test]
    fn test_density_three_node_chain_of_three_edges() {
        let analyzer = GraphComplexityAnalyzer::default();
        let g = analyzer.build_graph(&interactions(&[("a", "b"), ("b", "c"), ("a", "c")]));
        assert_eq!(analyzer.calculate_density(&g), 0.5);
    }

    #[test]
    fn test_empty_graph_metrics_are_zero() {
        let analyzer = GraphComplexityAnalyzer::default();
        let m = analyzer.analyze(&[]).unwrap();
        assert_eq!(m, GraphMetrics::default());

        let g = InteractionGraph::new();
        assert_eq!(analyzer.calculate_density(&g), 0.0);
        assert_eq!(analyzer.calculate_degree_centrality(&g), 0.0);
        assert_eq!(analyzer.calculate_betweenness_centrality(&g), 0.0);
        assert_eq!(analyzer.calculate_clustering_coefficient(&g), 0.0);
    }

    #[test]
    fn test_single_self_check_node() {
        let m = GraphComplexityAnalyzer::default()
            .analyze(&interactions(&[("solo", "solo")]))
            .unwrap();
        assert_eq!(m.num_nodes, 1);
        assert_eq!(m.num_edges, 1);
        assert_eq!(m.density, 0.0);
    }

    #[test]
    fn test_two_agents_one_edge() {
        let m = GraphComplexityAnalyzer::default()
            .analyze(&interactions(&[("a", "b"), ("a", "b")]))
            .unwrap();
        assert_eq!(m.num_nodes, 2);
        assert_eq!(m.num_edges, 1);
        assert_eq!(m.density, 0.5);
        assert_eq!(m.avg_degree_centrality, 1.0);
    }

    #[test]
    fn test_star_metrics_and_hub() {
        let analyzer = GraphComplexityAnalyzer::default();
        let g = analyzer.build_graph(&interactions(&[("hub", "a"), ("hub", "b"), ("hub", "c")]));
        let m = analyzer.analyze_graph(&g).unwrap();
        assert_eq!(m.avg_clustering_coefficient, 0.0);
        let patterns = analyzer.identify_coordination_patterns(&g);
        assert_eq!(patterns.hubs, vec!["hub".to_string()]);
    }

    #[test]
    fn test_triangle_clusters() {
        let m = GraphComplexityAnalyzer::default()
            .analyze(&interactions(&[("a", "b"), ("b", "c"), ("c", "a")]))
            .unwrap();
        assert!(m.avg_clustering_coefficient > 0.0);
    }
}
