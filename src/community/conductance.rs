//! Cut, volume and conductance of a node set.
//!
//! ```text
//! cut(S)         = Σ w(u, v)   for u ∈ S, v ∉ S
//! vol(S)         = Σ deg_w(u)  for u ∈ S   (self-loops count twice)
//! conductance(S) = cut(S) / vol(S)
//! ```
//!
//! Lower conductance means a tighter community. The ratio uses the set's own
//! volume, not `min(vol(S), vol(V \ S))`.

use std::collections::BTreeSet;

use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

use crate::graph::EdgeWeight;

/// Boundary weight and volume of `set`.
///
/// Members that are not nodes of `graph` are skipped. Runs in
/// O(Σ deg(u)) over the members.
pub fn cut_and_volume<N, E: EdgeWeight, Ty: EdgeType>(
    graph: &Graph<N, E, Ty>,
    set: &BTreeSet<usize>,
) -> (f64, f64) {
    let n = graph.node_count();
    let mut cut = 0.0;
    let mut volume = 0.0;
    for &u in set {
        if u >= n {
            continue;
        }
        for edge in graph.edges(NodeIndex::new(u)) {
            let v = edge.target().index();
            let w = edge.weight().weight();
            if !set.contains(&v) {
                cut += w;
            }
            volume += w;
            if u == v {
                volume += w;
            }
        }
    }
    (cut, volume)
}

/// Conductance `cut / volume` of `set`; `0.0` when the volume is zero.
pub fn conductance<N, E: EdgeWeight, Ty: EdgeType>(
    graph: &Graph<N, E, Ty>,
    set: &BTreeSet<usize>,
) -> f64 {
    let (cut, volume) = cut_and_volume(graph, set);
    if volume > 0.0 {
        cut / volume
    } else {
        0.0
    }
}
