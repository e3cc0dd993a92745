//! Local clustering coefficient on the undirected simplification.

use std::collections::BTreeMap;

use crate::graph::centrality::keyed;
use crate::graph::model::InteractionGraph;

/// `2 * T(v) / (k * (k - 1))` per node, where `k` is the undirected degree
/// and `T(v)` the number of links among `v`'s neighbours. `0.0` when `k < 2`.
pub(crate) fn clustering_scores(graph: &InteractionGraph) -> Vec<f64> {
    let n = graph.node_count();
    let neighborhoods: Vec<_> = (0..n).map(|v| graph.undirected_neighbors(v)).collect();

    neighborhoods
        .iter()
        .map(|neighbors| {
            let k = neighbors.len();
            if k < 2 {
                return 0.0;
            }
            let members: Vec<usize> = neighbors.iter().copied().collect();
            let mut links = 0usize;
            for (i, &u) in members.iter().enumerate() {
                for &w in &members[i + 1..] {
                    if neighborhoods[u].contains(&w) {
                        links += 1;
                    }
                }
            }
            (2 * links) as f64 / (k * (k - 1)) as f64
        })
        .collect()
}

/// Clustering coefficient keyed by agent id. Empty for an empty graph.
pub fn clustering(graph: &InteractionGraph) -> BTreeMap<String, f64> {
    keyed(graph, clustering_scores(graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::AgentInteraction;
    use chrono::{TimeZone, Utc};

    fn graph(edges: &[(&str, &str)]) -> InteractionGraph {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let interactions: Vec<AgentInteraction> = edges
            .iter()
            .map(|(a, b)| AgentInteraction::new(*a, *b, "msg", ts))
            .collect();
        InteractionGraph::from_interactions(&interactions)
    }

    #[test]
    fn test_directed_cycle_is_a_full_triangle() {
        let c = clustering(&graph(&[("a", "b"), ("b", "c"), ("c", "a")]));
        assert!(c.values().all(|v| *v == 1.0));
    }

    #[test]
    fn test_star_has_no_triangles() {
        let c = clustering(&graph(&[("hub", "a"), ("hub", "b"), ("hub", "c")]));
        assert!(c.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_partial_neighbourhood() {
        // d's neighbours a, b, c; only a-b linked: 1 of 3 possible pairs.
        let c = clustering(&graph(&[("d", "a"), ("d", "b"), ("d", "c"), ("a", "b")]));
        assert!((c["d"] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(c["a"], 1.0);
        assert_eq!(c["c"], 0.0);
    }

    #[test]
    fn test_reciprocal_edges_count_once() {
        let c = clustering(&graph(&[
            ("a", "b"),
            ("b", "a"),
            ("b", "c"),
            ("c", "b"),
            ("a", "c"),
        ]));
        assert!(c.values().all(|v| *v == 1.0));
    }

    #[test]
    fn test_self_loops_ignored() {
        let c = clustering(&graph(&[("a", "a"), ("a", "b"), ("a", "c")]));
        assert_eq!(c["a"], 0.0);
    }
}
