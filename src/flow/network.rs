//! Directed, edge-indexed capacity network.
//!
//! A [`FlowNetwork`] is the graph the push-relabel engine runs on. Arcs are
//! appended with [`FlowNetwork::add_arc`]; before the engine can use the
//! network, [`FlowNetwork::index_edges`] must pair every arc `u -> v` with a
//! partner arc `v -> u` and build a compact out-adjacency. Any later
//! `add_arc` drops the index again.
//!
//! ```text
//! arcs:     0: s->a  1: a->s  2: a->t  3: t->a
//! reverse:  [1, 0, 3, 2]
//! ```

use std::collections::{HashMap, VecDeque};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::{Error, Result};

/// An outgoing arc as seen from its tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OutArc {
    /// Head node.
    pub(crate) target: usize,
    /// Edge id of the arc.
    pub(crate) edge: usize,
}

/// Reverse-edge table plus CSR out-adjacency, valid until the next mutation.
#[derive(Debug, Clone)]
struct EdgeIndexTable {
    reverse: Vec<usize>,
    offsets: Vec<usize>,
    arcs: Vec<OutArc>,
}

/// Directed capacity network with dense node and edge ids.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    graph: DiGraph<(), f64>,
    index: Option<EdgeIndexTable>,
}

impl FlowNetwork {
    /// Create a network with `n` nodes and no arcs.
    pub fn new(n: usize) -> Self {
        Self::with_capacity(n, 0)
    }

    /// Create a network with `n` nodes and room for `arcs` arcs.
    pub fn with_capacity(n: usize, arcs: usize) -> Self {
        let mut graph = DiGraph::with_capacity(n, arcs);
        for _ in 0..n {
            let _ = graph.add_node(());
        }
        Self { graph, index: None }
    }

    /// Build an indexed network from `(tail, head, capacity)` triples.
    ///
    /// Every triple gets a zero-capacity partner arc in the opposite direction,
    /// so the input does not need to list reverse arcs.
    pub fn from_arcs(n: usize, arcs: &[(usize, usize, f64)]) -> Result<Self> {
        let mut network = Self::with_capacity(n, 2 * arcs.len());
        for &(u, v, capacity) in arcs {
            let _ = network.add_arc_pair(u, v, capacity, 0.0)?;
        }
        network.index_edges()?;
        Ok(network)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of arcs.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Append the arc `u -> v` and return its edge id.
    ///
    /// Capacities must be finite and non-negative.
    pub fn add_arc(&mut self, u: usize, v: usize, capacity: f64) -> Result<usize> {
        self.check_node(u)?;
        self.check_node(v)?;
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(Error::InvalidParameter {
                name: "capacity",
                message: "must be finite and non-negative",
            });
        }
        self.index = None;
        let e = self
            .graph
            .add_edge(NodeIndex::new(u), NodeIndex::new(v), capacity);
        Ok(e.index())
    }

    /// Append `u -> v` and its partner `v -> u`; returns both edge ids.
    pub fn add_arc_pair(
        &mut self,
        u: usize,
        v: usize,
        forward: f64,
        backward: f64,
    ) -> Result<(usize, usize)> {
        let e = self.add_arc(u, v, forward)?;
        let r = self.add_arc(v, u, backward)?;
        Ok((e, r))
    }

    /// Whether [`index_edges`](Self::index_edges) ran since the last mutation.
    pub fn has_edge_ids(&self) -> bool {
        self.index.is_some()
    }

    /// Pair every arc with a reverse arc and build the out-adjacency.
    ///
    /// Parallel arcs are paired in insertion order: the k-th `u -> v` arc is
    /// matched with the k-th `v -> u` arc. A self-loop is its own reverse.
    pub fn index_edges(&mut self) -> Result<()> {
        let m = self.graph.edge_count();
        let n = self.graph.node_count();
        let mut reverse = vec![usize::MAX; m];
        let mut pending: HashMap<(usize, usize), VecDeque<usize>> = HashMap::new();

        for edge in self.graph.edge_references() {
            let e = edge.id().index();
            let u = edge.source().index();
            let v = edge.target().index();
            if u == v {
                reverse[e] = e;
                continue;
            }
            match pending.get_mut(&(v, u)).and_then(VecDeque::pop_front) {
                Some(r) => {
                    reverse[e] = r;
                    reverse[r] = e;
                }
                None => pending.entry((u, v)).or_default().push_back(e),
            }
        }

        let unpaired = pending
            .iter()
            .filter_map(|(&(u, v), waiting)| waiting.front().map(|&e| (e, u, v)))
            .min();
        if let Some((_, source, target)) = unpaired {
            return Err(Error::MissingReverseEdge { source, target });
        }

        let mut offsets = vec![0usize; n + 1];
        for edge in self.graph.raw_edges() {
            offsets[edge.source().index() + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }
        let mut cursor = offsets.clone();
        let mut arcs = vec![OutArc { target: 0, edge: 0 }; m];
        for (e, edge) in self.graph.raw_edges().iter().enumerate() {
            let u = edge.source().index();
            arcs[cursor[u]] = OutArc {
                target: edge.target().index(),
                edge: e,
            };
            cursor[u] += 1;
        }

        self.index = Some(EdgeIndexTable {
            reverse,
            offsets,
            arcs,
        });
        Ok(())
    }

    /// Capacity of arc `e`.
    pub fn capacity(&self, e: usize) -> Option<f64> {
        self.graph.edge_weight(EdgeIndex::new(e)).copied()
    }

    /// `(tail, head)` of arc `e`.
    pub fn endpoints(&self, e: usize) -> Option<(usize, usize)> {
        self.graph
            .edge_endpoints(EdgeIndex::new(e))
            .map(|(u, v)| (u.index(), v.index()))
    }

    /// Edge id of some arc `u -> v`, if one exists. Linear in the degree of `u`.
    pub fn find_arc(&self, u: usize, v: usize) -> Option<usize> {
        if u >= self.node_count() || v >= self.node_count() {
            return None;
        }
        self.graph
            .find_edge(NodeIndex::new(u), NodeIndex::new(v))
            .map(|e| e.index())
    }

    /// Partner arc of `e`. `None` before indexing.
    pub fn reverse_of(&self, e: usize) -> Option<usize> {
        self.index.as_ref().and_then(|idx| idx.reverse.get(e).copied())
    }

    /// Out-arcs of `u`. Empty before indexing.
    pub(crate) fn out_arcs(&self, u: usize) -> &[OutArc] {
        match &self.index {
            Some(idx) => &idx.arcs[idx.offsets[u]..idx.offsets[u + 1]],
            None => &[],
        }
    }

    /// Reverse table. Empty before indexing.
    pub(crate) fn reverse_table(&self) -> &[usize] {
        match &self.index {
            Some(idx) => &idx.reverse,
            None => &[],
        }
    }

    fn check_node(&self, u: usize) -> Result<()> {
        let bound = self.node_count();
        if u >= bound {
            return Err(Error::NodeOutOfRange { node: u, bound });
        }
        Ok(())
    }
}
