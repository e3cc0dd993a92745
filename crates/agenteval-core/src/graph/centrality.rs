//! Degree and betweenness centrality.
//!
//! Scores are computed per node index (first-appearance order); the public
//! map-returning helpers key them by agent id.

use std::collections::{BTreeMap, VecDeque};

use crate::graph::model::InteractionGraph;

/// `(in_degree + out_degree) / (n - 1)` per node, self-loops excluded.
/// All zeros when `n <= 1`.
pub(crate) fn degree_scores(graph: &InteractionGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![0.0; n];
    }
    let denom = (n - 1) as f64;
    (0..n)
        .map(|v| (graph.in_degree(v) + graph.out_degree(v)) as f64 / denom)
        .collect()
}

/// Shortest-path betweenness per node on the directed, unweighted graph,
/// normalised by `(n - 1)(n - 2)`.
///
/// Brandes' algorithm: one BFS per source, then dependency accumulation in
/// reverse BFS order.
pub(crate) fn betweenness_scores(graph: &InteractionGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];
    if n <= 2 {
        // No node can sit strictly between two others.
        return centrality;
    }

    let mut stack: Vec<usize> = Vec::with_capacity(n);
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::with_capacity(n);

    for s in 0..n {
        stack.clear();
        for p in preds.iter_mut() {
            p.clear();
        }
        sigma.iter_mut().for_each(|x| *x = 0.0);
        dist.iter_mut().for_each(|x| *x = -1);
        delta.iter_mut().for_each(|x| *x = 0.0);

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in graph.successors(v) {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    for c in centrality.iter_mut() {
        *c *= scale;
    }
    centrality
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn keyed(graph: &InteractionGraph, scores: Vec<f64>) -> BTreeMap<String, f64> {
    graph.nodes().iter().cloned().zip(scores).collect()
}

/// Degree centrality keyed by agent id. Empty for an empty graph.
pub fn degree_centrality(graph: &InteractionGraph) -> BTreeMap<String, f64> {
    keyed(graph, degree_scores(graph))
}

/// Betweenness centrality keyed by agent id. Empty for an empty graph.
pub fn betweenness_centrality(graph: &InteractionGraph) -> BTreeMap<String, f64> {
    keyed(graph, betweenness_scores(graph))
}
