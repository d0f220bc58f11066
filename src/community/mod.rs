//! Selective (local) community detection.
//!
//! Whole-graph detectors partition every node. Selective detectors answer a
//! narrower question: given a few seed nodes, which community do they belong
//! to? They only touch the region around the seed, so they scale to graphs
//! far larger than the community of interest.
//!
//! ## The Conductance Objective
//!
//! Communities here are scored by **conductance**, the fraction of a set's
//! edge weight that leaves it:
//!
//! ```text
//! φ(S) = cut(S) / vol(S)
//! ```
//!
//! Where:
//! - cut(S) = total weight of edges with exactly one endpoint in S
//! - vol(S) = sum of weighted degrees of S (self-loops count twice)
//!
//! Lower is better. A set with φ = 0 has no outside edges at all.
//!
//! ## Algorithms
//!
//! ### MQI
//!
//! Max-flow Quotient-cut Improvement ([Lang & Rao 2004](https://doi.org/10.1007/978-3-540-25960-2_25))
//! takes a seed set and repeatedly shrinks it to the subset of minimum
//! conductance, using one max-flow computation per step. It never adds
//! nodes, so the result is always a subset of the seed.
//!
//! ### Closed Neighbourhood
//!
//! Grows the seed by its neighbours. Cheap and crude; intended to feed MQI.
//!
//! ### Composition
//!
//! [`Combined`] chains two detectors. [`EdgeScoreThen`] reweights the graph
//! with an [`EdgeScore`] (for example [`NeighborhoodJaccard`]) before running a
//! detector.
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use petgraph::graph::UnGraph;
//! use flowcut::community::{conductance, Mqi};
//!
//! // Two triangles joined by a bridge 2-3.
//! let mut graph = UnGraph::<(), ()>::new_undirected();
//! let n: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
//! for (a, b) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
//!     graph.add_edge(n[a], n[b], ());
//! }
//!
//! let seed = BTreeSet::from([0, 1, 2, 3]);
//! let refined = Mqi::new().refine(&graph, &seed).unwrap();
//! assert_eq!(refined.community, BTreeSet::from([0, 1, 2]));
//! assert!(conductance(&graph, &refined.community) < conductance(&graph, &seed));
//! ```
//!
//! ## References
//!
//! - Lang, Rao (2004). "A flow-based method for improving the expansion or
//!   conductance of graph cuts." IPCO 2004.
//! - Andersen, Lang (2008). "An algorithm for improving graph partitions." SODA 2008.

mod combined;
mod conductance;
mod edge_score;
mod mqi;
mod neighborhood;
mod traits;

pub use combined::{Combined, EdgeScoreThen};
pub use conductance::{conductance, cut_and_volume};
pub use edge_score::{EdgeScore, NeighborhoodJaccard};
pub use mqi::{Mqi, NumericAnomaly, Refinement, Termination};
pub use neighborhood::ClosedNeighborhood;
pub use traits::SelectiveCommunityDetection;
