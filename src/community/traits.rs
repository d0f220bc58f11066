//! Selective community detection traits.

use std::collections::BTreeSet;

use petgraph::graph::UnGraph;

use crate::error::Result;
use crate::graph::EdgeWeight;

/// Trait for algorithms that find one community around a set of seed nodes.
///
/// Unlike whole-graph detection, a selective detector only looks at the
/// region around its seed. Detectors compose: the output community of one
/// can be the seed of the next (see [`Combined`](super::Combined)).
pub trait SelectiveCommunityDetection {
    /// Expand (or refine) a seed set into a community.
    ///
    /// Returns node ids (`NodeIndex::index()`) of the community.
    fn expand_one_community<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        seed: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>>;

    /// Expand a single seed node into a community.
    fn expand_from_node<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        node: usize,
    ) -> Result<BTreeSet<usize>> {
        self.expand_one_community(graph, &BTreeSet::from([node]))
    }
}
