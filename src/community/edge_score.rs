//! Per-edge scores used to reweight a graph before detection.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::error::Result;
use crate::graph::EdgeWeight;

/// A score for every edge of a graph.
///
/// `scores(graph)[e]` is the score of the edge with id `e`, so the returned
/// vector has `graph.edge_count()` entries. Higher means the endpoints are
/// more likely to share a community.
pub trait EdgeScore {
    /// Score all edges of `graph`.
    fn scores<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Vec<f64>>;
}

/// Jaccard overlap of closed neighbourhoods.
///
/// ```text
/// score(u, v) = |N[u] ∩ N[v]| / |N[u] ∪ N[v]|     N[x] = {x} ∪ neighbours(x)
/// ```
///
/// Using closed neighbourhoods keeps every edge strictly positive: `u` and
/// `v` are always in both sets. Edges inside a triangle score higher than a
/// bridge between two dense groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighborhoodJaccard;

impl NeighborhoodJaccard {
    /// Create the scorer.
    pub fn new() -> Self {
        Self
    }
}

impl EdgeScore for NeighborhoodJaccard {
    fn scores<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Vec<f64>> {
        let closed: Vec<Vec<usize>> = graph
            .node_indices()
            .map(|u| closed_neighborhood(graph, u))
            .collect();

        Ok(graph
            .edge_references()
            .map(|e| {
                let a = &closed[e.source().index()];
                let b = &closed[e.target().index()];
                let common = sorted_intersection_len(a, b);
                common as f64 / (a.len() + b.len() - common) as f64
            })
            .collect())
    }
}

/// Sorted, deduplicated `{u} ∪ neighbours(u)`.
fn closed_neighborhood<N, E>(graph: &UnGraph<N, E>, u: NodeIndex) -> Vec<usize> {
    let mut set: Vec<usize> = graph.neighbors(u).map(|v| v.index()).collect();
    set.push(u.index());
    set.sort_unstable();
    set.dedup();
    set
}

fn sorted_intersection_len(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_triangles() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let n: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
        for (a, b) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
            let _ = graph.add_edge(n[a], n[b], ());
        }
        let scores = NeighborhoodJaccard::new().scores(&graph).unwrap();
        assert_eq!(scores.len(), 7);

        // N[0] = N[1] = {0, 1, 2}
        assert!((scores[0] - 1.0).abs() < 1e-12);
        // N[1] = {0, 1, 2}, N[2] = {0, 1, 2, 3}
        assert!((scores[1] - 0.75).abs() < 1e-12);
        // The bridge shares only its own endpoints out of six nodes.
        assert!((scores[6] - 1.0 / 3.0).abs() < 1e-12);
        assert!(scores.iter().all(|&s| s > 0.0 && s <= 1.0));
    }

    #[test]
    fn test_parallel_edges_and_self_loops() {
        let mut graph = UnGraph::<(), f64>::new_undirected();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let _ = graph.add_edge(a, b, 1.0);
        let _ = graph.add_edge(a, b, 5.0);
        let _ = graph.add_edge(a, a, 1.0);
        let scores = NeighborhoodJaccard::new().scores(&graph).unwrap();
        assert_eq!(scores, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = UnGraph::<(), ()>::new_undirected();
        assert!(NeighborhoodJaccard::new().scores(&graph).unwrap().is_empty());
    }

    #[test]
    fn test_intersection_len() {
        assert_eq!(sorted_intersection_len(&[1, 3, 5, 7], &[2, 3, 4, 7, 9]), 2);
        assert_eq!(sorted_intersection_len(&[], &[1]), 0);
    }
}
