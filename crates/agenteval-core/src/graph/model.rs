//! Weighted simple directed graph over agent identifiers.
//!
//! Repeated interactions between the same ordered pair collapse into one
//! edge whose `weight` counts them. Nodes and edges keep first-appearance
//! order so every aggregate is summed in the same order on every run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::records::AgentInteraction;

/// A collapsed edge between two agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEdge {
    pub source: String,
    pub target: String,
    /// Number of interactions folded into this edge.
    pub weight: u64,
    /// Type of the most recent interaction on this edge.
    pub interaction_type: String,
    /// Timestamp of the most recent interaction on this edge.
    pub timestamp: DateTime<Utc>,
    /// Metadata of the most recent interaction that carried any.
    pub metadata: Option<BTreeMap<String, String>>,
}

impl InteractionEdge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    nodes: Vec<String>,
    node_index: HashMap<String, usize>,
    edges: Vec<InteractionEdge>,
    edge_index: HashMap<(usize, usize), usize>,
    /// Successors per node, self-loops excluded, in insertion order.
    successors: Vec<Vec<usize>>,
    /// Predecessors per node, self-loops excluded, in insertion order.
    predecessors: Vec<Vec<usize>>,
    self_loops: usize,
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_interactions<'a, I>(interactions: I) -> Self
    where
        I: IntoIterator<Item = &'a AgentInteraction>,
    {
        let mut graph = Self::new();
        for interaction in interactions {
            graph.add_interaction(interaction);
        }
        graph
    }

    /// Register a node. Idempotent; returns the node's index.
    pub fn add_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(id.to_string());
        self.node_index.insert(id.to_string(), idx);
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        idx
    }

    /// Fold one interaction into the graph.
    pub fn add_interaction(&mut self, interaction: &AgentInteraction) {
        let from = self.add_node(&interaction.from_agent);
        let to = self.add_node(&interaction.to_agent);

        if let Some(&edge_idx) = self.edge_index.get(&(from, to)) {
            let edge = &mut self.edges[edge_idx];
            edge.weight += 1;
            if interaction.timestamp >= edge.timestamp {
                edge.timestamp = interaction.timestamp;
                edge.interaction_type = interaction.interaction_type.clone();
                if interaction.metadata.is_some() {
                    edge.metadata = interaction.metadata.clone();
                }
            }
            return;
        }

        self.edge_index.insert((from, to), self.edges.len());
        self.edges.push(InteractionEdge {
            source: interaction.from_agent.clone(),
            target: interaction.to_agent.clone(),
            weight: 1,
            interaction_type: interaction.interaction_type.clone(),
            timestamp: interaction.timestamp,
            metadata: interaction.metadata.clone(),
        });

        if from == to {
            self.self_loops += 1;
        } else {
            self.successors[from].push(to);
            self.predecessors[to].push(from);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Distinct directed edges, self-loops included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn self_loop_count(&self) -> usize {
        self.self_loops
    }

    /// Distinct directed edges between different agents.
    pub fn proper_edge_count(&self) -> usize {
        self.edges.len() - self.self_loops
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[InteractionEdge] {
        &self.edges
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edge(from, to).is_some()
    }

    pub fn edge(&self, from: &str, to: &str) -> Option<&InteractionEdge> {
        let from = self.index_of(from)?;
        let to = self.index_of(to)?;
        self.edge_index.get(&(from, to)).map(|&i| &self.edges[i])
    }

    pub(crate) fn successors(&self, idx: usize) -> &[usize] {
        &self.successors[idx]
    }

    /// Out-degree, self-loops excluded.
    pub fn out_degree(&self, idx: usize) -> usize {
        self.successors[idx].len()
    }

    /// In-degree, self-loops excluded.
    pub fn in_degree(&self, idx: usize) -> usize {
        self.predecessors[idx].len()
    }

    /// Neighbours in the undirected simplification: an edge exists if either
    /// direction exists. Self-loops are dropped.
    pub(crate) fn undirected_neighbors(&self, idx: usize) -> BTreeSet<usize> {
        self.successors[idx]
            .iter()
            .chain(self.predecessors[idx].iter())
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap() + Duration::seconds(offset)
    }

    fn msg(from: &str, to: &str, kind: &str, offset: i64) -> AgentInteraction {
        AgentInteraction::new(from, to, kind, t(offset))
    }

    #[test]
    fn test_repeated_pairs_collapse_into_weight() {
        let interactions = vec![
            msg("a", "b", "request", 0),
            msg("a", "b", "followup", 5),
            msg("b", "a", "reply", 3),
        ];
        let g = InteractionGraph::from_interactions(&interactions);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        let ab = g.edge("a", "b").unwrap();
        assert_eq!(ab.weight, 2);
        assert_eq!(ab.interaction_type, "followup");
        assert_eq!(ab.timestamp, t(5));
    }

    #[test]
    fn test_self_interaction_registers_one_node() {
        let g = InteractionGraph::from_interactions(&[msg("solo", "solo", "self_check", 0)]);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.self_loop_count(), 1);
        assert_eq!(g.proper_edge_count(), 0);
        let idx = g.index_of("solo").unwrap();
        assert_eq!(g.in_degree(idx) + g.out_degree(idx), 0);
    }

    #[test]
    fn test_node_order_is_first_appearance() {
        let g = InteractionGraph::from_interactions(&[
            msg("c", "a", "x", 0),
            msg("b", "c", "x", 1),
        ]);
        assert_eq!(g.nodes(), &["c".to_string(), "a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_older_interaction_keeps_latest_attributes() {
        let newer = msg("a", "b", "newer", 10).with_metadata("k", "v");
        let older = msg("a", "b", "older", 1);
        let g = InteractionGraph::from_interactions(&[newer, older]);
        let edge = g.edge("a", "b").unwrap();
        assert_eq!(edge.weight, 2);
        assert_eq!(edge.interaction_type, "newer");
        assert!(edge.metadata.is_some());
    }

    #[test]
    fn test_undirected_neighbors_merge_directions() {
        let g = InteractionGraph::from_interactions(&[
            msg("a", "b", "x", 0),
            msg("b", "a", "x", 1),
            msg("c", "a", "x", 2),
        ]);
        let a = g.index_of("a").unwrap();
        assert_eq!(g.undirected_neighbors(a).len(), 2);
    }
}
