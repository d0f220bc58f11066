//! Seed expansion by graph distance.

use std::collections::BTreeSet;

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::debug;

use super::traits::SelectiveCommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{validate_seed, EdgeWeight};

/// Grow a seed to every node within `hops` steps of it.
///
/// With the default of one hop this is the closed neighbourhood: the seed
/// plus all of its neighbours. Edge weights are ignored. It is mostly useful
/// as the first stage of a [`Combined`](super::Combined) pipeline, producing a
/// rough community for a refiner such as [`Mqi`](super::Mqi) to shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedNeighborhood {
    hops: usize,
}

impl ClosedNeighborhood {
    /// One-hop closed neighbourhood.
    pub fn new() -> Self {
        Self { hops: 1 }
    }

    /// Expand `hops` steps instead of one. Must be at least one.
    pub fn with_hops(mut self, hops: usize) -> Self {
        self.hops = hops;
        self
    }

    /// Number of steps the seed is grown by.
    pub fn hops(&self) -> usize {
        self.hops
    }
}

impl Default for ClosedNeighborhood {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectiveCommunityDetection for ClosedNeighborhood {
    fn expand_one_community<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        seed: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>> {
        if self.hops == 0 {
            return Err(Error::InvalidParameter {
                name: "hops",
                message: "must be at least 1",
            });
        }
        validate_seed(graph, seed)?;

        let mut community = seed.clone();
        let mut frontier: Vec<usize> = seed.iter().copied().collect();
        for _ in 0..self.hops {
            let mut next = Vec::new();
            for &u in &frontier {
                for v in graph.neighbors(NodeIndex::new(u)) {
                    if community.insert(v.index()) {
                        next.push(v.index());
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        debug!(
            seed = seed.len(),
            community = community.len(),
            hops = self.hops,
            "neighbourhood expanded"
        );
        Ok(community)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> UnGraph<(), ()> {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let nodes: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
        for w in nodes.windows(2) {
            let _ = graph.add_edge(w[0], w[1], ());
        }
        graph
    }

    #[test]
    fn test_one_hop() {
        let graph = path(5);
        let community = ClosedNeighborhood::new().expand_from_node(&graph, 2).unwrap();
        assert_eq!(community, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_two_hops() {
        let graph = path(6);
        let community = ClosedNeighborhood::new()
            .with_hops(2)
            .expand_from_node(&graph, 0)
            .unwrap();
        assert_eq!(community, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_hops_beyond_component() {
        let graph = path(3);
        let community = ClosedNeighborhood::new()
            .with_hops(10)
            .expand_from_node(&graph, 1)
            .unwrap();
        assert_eq!(community, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_multi_node_seed() {
        let graph = path(7);
        let community = ClosedNeighborhood::new()
            .expand_one_community(&graph, &BTreeSet::from([0, 6]))
            .unwrap();
        assert_eq!(community, BTreeSet::from([0, 1, 5, 6]));
    }

    #[test]
    fn test_isolated_seed() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let _ = graph.add_node(());
        let community = ClosedNeighborhood::new().expand_from_node(&graph, 0).unwrap();
        assert_eq!(community, BTreeSet::from([0]));
    }

    #[test]
    fn test_rejects_bad_input() {
        let graph = path(3);
        assert_eq!(
            ClosedNeighborhood::new()
                .expand_one_community(&graph, &BTreeSet::new())
                .unwrap_err(),
            Error::EmptyInput
        );
        assert_eq!(
            ClosedNeighborhood::new()
                .expand_from_node(&graph, 3)
                .unwrap_err(),
            Error::NodeOutOfRange { node: 3, bound: 3 }
        );
        assert!(matches!(
            ClosedNeighborhood::new()
                .with_hops(0)
                .expand_from_node(&graph, 0),
            Err(Error::InvalidParameter { name: "hops", .. })
        ));
    }
}
