//! Hub / bridge / isolated detection.

use serde::{Deserialize, Serialize};

use crate::config::GraphConfig;
use crate::graph::centrality::{betweenness_scores, degree_scores, mean};
use crate::graph::model::InteractionGraph;

/// Structural roles found in an interaction graph. Every list is in
/// first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinationPatterns {
    /// Degree centrality above `hub_ratio` times the graph mean.
    pub hubs: Vec<String>,
    /// Betweenness centrality above `bridge_threshold`.
    pub bridges: Vec<String>,
    /// No edges to or from any other agent.
    pub isolated: Vec<String>,
    /// Agent pairs with edges in both directions, each pair sorted.
    pub bidirectional_pairs: Vec<(String, String)>,
}

pub(crate) fn identify(graph: &InteractionGraph, config: &GraphConfig) -> CoordinationPatterns {
    if graph.is_empty() {
        return CoordinationPatterns::default();
    }
    let nodes = graph.nodes();

    let degree = degree_scores(graph);
    let avg_degree = mean(&degree);
    let hub_cutoff = config.hub_ratio * avg_degree;
    let hubs = if avg_degree > 0.0 {
        nodes
            .iter()
            .zip(&degree)
            .filter(|(_, score)| **score > hub_cutoff)
            .map(|(id, _)| id.clone())
            .collect()
    } else {
        Vec::new()
    };

    let betweenness = betweenness_scores(graph);
    let bridges = nodes
        .iter()
        .zip(&betweenness)
        .filter(|(_, score)| **score > config.bridge_threshold)
        .map(|(id, _)| id.clone())
        .collect();

    let isolated = (0..graph.node_count())
        .filter(|&v| graph.in_degree(v) + graph.out_degree(v) == 0)
        .map(|v| nodes[v].clone())
        .collect();

    // Each reciprocal pair is reported once, from its lexicographically
    // ordered edge.
    let bidirectional_pairs = graph
        .edges()
        .iter()
        .filter(|e| e.source < e.target && graph.has_edge(&e.target, &e.source))
        .map(|e| (e.source.clone(), e.target.clone()))
        .collect();

    CoordinationPatterns {
        hubs,
        bridges,
        isolated,
        bidirectional_pairs,
    }
}
