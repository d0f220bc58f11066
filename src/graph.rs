//! Read-only queries over `petgraph` graphs.
//!
//! The refiners never own or mutate the input graph. They only need weighted
//! adjacency, degrees and node-id validation, which this module provides on top
//! of [`petgraph::graph::Graph`].
//!
//! Node ids are `NodeIndex::index()`, dense in `[0, node_count)`. Edge ids are
//! `EdgeIndex::index()`, dense in `[0, edge_count)`.

use std::collections::BTreeSet;

use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

use crate::error::{Error, Result};

/// Numeric weight carried by a graph edge.
///
/// Implemented for the common numeric types and for `()`, which counts as a
/// unit weight so that unweighted `UnGraph<(), ()>` graphs work directly.
pub trait EdgeWeight {
    /// The weight as `f64`.
    fn weight(&self) -> f64;
}

impl EdgeWeight for () {
    fn weight(&self) -> f64 {
        1.0
    }
}

impl EdgeWeight for f64 {
    fn weight(&self) -> f64 {
        *self
    }
}

impl EdgeWeight for f32 {
    fn weight(&self) -> f64 {
        f64::from(*self)
    }
}

macro_rules! int_edge_weight {
    ($($t:ty),*) => {
        $(
            impl EdgeWeight for $t {
                fn weight(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

int_edge_weight!(u8, u16, u32, u64, usize, i32, i64);

/// Number of edges incident to `u` (out-edges for directed graphs).
pub fn degree<N, E, Ty: EdgeType>(graph: &Graph<N, E, Ty>, u: usize) -> usize {
    graph.edges(NodeIndex::new(u)).count()
}

/// Sum of incident edge weights of `u`.
///
/// With `count_self_loops_twice`, a self-loop contributes its weight twice,
/// matching the convention that a loop has two endpoints at `u`.
pub fn weighted_degree<N, E: EdgeWeight, Ty: EdgeType>(
    graph: &Graph<N, E, Ty>,
    u: usize,
    count_self_loops_twice: bool,
) -> f64 {
    let mut total = 0.0;
    for edge in graph.edges(NodeIndex::new(u)) {
        let w = edge.weight().weight();
        total += w;
        if count_self_loops_twice && edge.target().index() == u {
            total += w;
        }
    }
    total
}

/// Sum of all edge weights, each edge counted once.
pub fn total_edge_weight<N, E: EdgeWeight, Ty: EdgeType>(graph: &Graph<N, E, Ty>) -> f64 {
    graph.edge_references().map(|e| e.weight().weight()).sum()
}

/// Check that `u` is a node of `graph`.
pub fn check_node<N, E, Ty: EdgeType>(graph: &Graph<N, E, Ty>, u: usize) -> Result<()> {
    let bound = graph.node_count();
    if u >= bound {
        return Err(Error::NodeOutOfRange { node: u, bound });
    }
    Ok(())
}

/// Check that a seed set is non-empty and only names existing nodes.
pub fn validate_seed<N, E, Ty: EdgeType>(
    graph: &Graph<N, E, Ty>,
    seed: &BTreeSet<usize>,
) -> Result<()> {
    if seed.is_empty() {
        return Err(Error::EmptyInput);
    }
    // BTreeSet is ordered, so only the largest id can be out of range.
    if let Some(&last) = seed.last() {
        check_node(graph, last)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::UnGraph;

    #[test]
    fn test_weighted_degree_self_loop() {
        let mut graph = UnGraph::<(), f64>::new_undirected();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let _ = graph.add_edge(a, b, 2.0);
        let _ = graph.add_edge(a, a, 0.5);

        assert!((weighted_degree(&graph, 0, false) - 2.5).abs() < 1e-12);
        assert!((weighted_degree(&graph, 0, true) - 3.0).abs() < 1e-12);
        assert!((weighted_degree(&graph, 1, true) - 2.0).abs() < 1e-12);
        assert_eq!(degree(&graph, 0), 2);
    }

    #[test]
    fn test_unit_weights() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let c = graph.add_node(());
        let _ = graph.add_edge(a, b, ());
        let _ = graph.add_edge(b, c, ());

        assert!((weighted_degree(&graph, 1, true) - 2.0).abs() < 1e-12);
        assert!((weighted_degree(&graph, 2, true) - 1.0).abs() < 1e-12);
        assert!((total_edge_weight(&graph) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_seed() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let _ = graph.add_node(());
        let _ = graph.add_node(());

        assert_eq!(
            validate_seed(&graph, &BTreeSet::new()),
            Err(Error::EmptyInput)
        );
        assert_eq!(
            validate_seed(&graph, &BTreeSet::from([0, 5])),
            Err(Error::NodeOutOfRange { node: 5, bound: 2 })
        );
        assert!(validate_seed(&graph, &BTreeSet::from([0, 1])).is_ok());
    }
}
