//! Composition of selective detectors.
//!
//! Local community pipelines are usually two stages: something cheap that
//! grows a rough community around the seed, then something precise that
//! cleans it up. Both [`Combined`] and [`EdgeScoreThen`] are themselves
//! detectors, so pipelines nest.
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use petgraph::graph::UnGraph;
//! use flowcut::community::{ClosedNeighborhood, Combined, Mqi, SelectiveCommunityDetection};
//!
//! let mut graph = UnGraph::<(), ()>::new_undirected();
//! let n: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
//! for (a, b) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
//!     graph.add_edge(n[a], n[b], ());
//! }
//!
//! // Grow {2} to its neighbourhood {0, 1, 2, 3}, then let MQI trim node 3.
//! let pipeline = Combined::new(ClosedNeighborhood::new(), Mqi::new());
//! let community = pipeline.expand_from_node(&graph, 2).unwrap();
//! assert_eq!(community, BTreeSet::from([0, 1, 2]));
//! ```

use std::collections::BTreeSet;

use petgraph::graph::UnGraph;

use super::edge_score::EdgeScore;
use super::traits::SelectiveCommunityDetection;
use crate::error::{Error, Result};
use crate::graph::EdgeWeight;

/// Run `first`, then feed its community to `second` as the seed.
#[derive(Debug, Clone)]
pub struct Combined<F, S> {
    first: F,
    second: S,
}

impl<F, S> Combined<F, S> {
    /// Chain two detectors.
    pub fn new(first: F, second: S) -> Self {
        Self { first, second }
    }
}

impl<F, S> SelectiveCommunityDetection for Combined<F, S>
where
    F: SelectiveCommunityDetection,
    S: SelectiveCommunityDetection,
{
    fn expand_one_community<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        seed: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>> {
        let expanded = self.first.expand_one_community(graph, seed)?;
        self.second.expand_one_community(graph, &expanded)
    }
}

/// Reweight the graph by an edge score, then run a detector on the result.
///
/// The reweighted copy keeps node and edge ids, so the detector's community
/// is valid on the original graph too.
#[derive(Debug, Clone)]
pub struct EdgeScoreThen<S, D> {
    score: S,
    detector: D,
}

impl<S, D> EdgeScoreThen<S, D> {
    /// Score edges with `score`, then detect with `detector`.
    pub fn new(score: S, detector: D) -> Self {
        Self { score, detector }
    }
}

impl<S, D> EdgeScoreThen<S, D>
where
    S: EdgeScore,
{
    /// Copy of `graph` whose edge weights are the scores.
    pub fn reweight<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<UnGraph<(), f64>> {
        let scores = self.score.scores(graph)?;
        if scores.len() != graph.edge_count() {
            return Err(Error::DimensionMismatch {
                expected: graph.edge_count(),
                found: scores.len(),
            });
        }
        Ok(graph.map(|_, _| (), |e, _| scores[e.index()]))
    }
}

impl<S, D> SelectiveCommunityDetection for EdgeScoreThen<S, D>
where
    S: EdgeScore,
    D: SelectiveCommunityDetection,
{
    fn expand_one_community<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        seed: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>> {
        let reweighted = self.reweight(graph)?;
        self.detector.expand_one_community(&reweighted, seed)
    }
}
