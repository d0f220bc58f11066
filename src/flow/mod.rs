//! Maximum flow / minimum cut.
//!
//! Given a directed network with arc capacities, a source `s` and a sink `t`,
//! find the largest amount of flow that can be routed from `s` to `t`. By
//! max-flow/min-cut duality the same computation yields a minimum `s`-`t`
//! cut: a partition of the nodes whose crossing capacity equals the flow.
//!
//! ```text
//!        3        3
//!   s -----> a -----> t          max flow = 5
//!   |        | 1      ^          min cut  = {s->a, s->b}
//!   |  2     v    2   |
//!   +------> b -------+
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use flowcut::flow::{FlowNetwork, PushRelabel};
//!
//! let mut network = FlowNetwork::new(4);
//! network.add_arc_pair(0, 1, 3.0, 0.0).unwrap();
//! network.add_arc_pair(0, 2, 2.0, 0.0).unwrap();
//! network.add_arc_pair(1, 3, 3.0, 0.0).unwrap();
//! network.add_arc_pair(2, 3, 2.0, 0.0).unwrap();
//! network.add_arc_pair(1, 2, 1.0, 0.0).unwrap();
//! network.index_edges().unwrap();
//!
//! let mut flow = PushRelabel::new(&network, 0, 3).unwrap();
//! flow.run().unwrap();
//! assert!((flow.max_flow().unwrap() - 5.0).abs() < 1e-9);
//! assert!(!flow.source_set().unwrap().contains(&3));
//! ```

mod network;
mod push_relabel;

pub use network::FlowNetwork;
pub use push_relabel::{FlowStats, PushRelabel, RunState, FLOW_TOLERANCE};
