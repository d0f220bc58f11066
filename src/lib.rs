//! # flowcut
//!
//! Max-flow / min-cut and flow-based local community refinement.
//!
//! - [`flow`]: a FIFO push-relabel engine over a petgraph-backed
//!   [`FlowNetwork`](flow::FlowNetwork), with minimum-cut extraction.
//! - [`community`]: conductance, the MQI refiner built on the flow engine, and
//!   composable selective detectors.
//! - [`graph`]: the read-only graph queries both share.
//!
//! Graphs are plain [`petgraph`] graphs; node ids are `NodeIndex::index()`.
//! Nothing here installs a `tracing` subscriber. Diagnostics are emitted as
//! `tracing` events for the application to collect.

pub mod community;
/// Error types used across `flowcut`.
pub mod error;
pub mod flow;
pub mod graph;

pub use community::{
    conductance, cut_and_volume, ClosedNeighborhood, Combined, EdgeScore, EdgeScoreThen, Mqi,
    NeighborhoodJaccard, NumericAnomaly, Refinement, SelectiveCommunityDetection, Termination,
};
pub use error::{Error, ErrorKind, Result};
pub use flow::{FlowNetwork, PushRelabel};
pub use graph::EdgeWeight;
