//! MQI: flow-based conductance improvement of a community.
//!
//! Trims a community to a local optimum of conductance by solving a sequence
//! of minimum-cut problems.
//!
//! ## The Algorithm (Lang & Rao 2004)
//!
//! Given a community `S` with boundary weight `c = cut(S)` and volume
//! `v = vol(S)`, MQI asks whether some subset `S' ⊆ S` has strictly lower
//! conductance. That question is a single max-flow problem on a network built
//! from `S` alone:
//!
//! ```text
//!            v·cut_w(u)              c·deg_w(u)
//!   source ─────────────▶  u ∈ S  ─────────────▶ sink
//!                          │  ▲
//!                        v │  │ v      (every arc inside S)
//!                          ▼  │
//!                          u' ∈ S
//! ```
//!
//! Every source arc together carries `v · c`, and so do the sink arcs. If the
//! maximum flow saturates all of them (flow ≈ `c · v`), no subset improves on
//! `S` and the loop stops. Otherwise the source side of the minimum cut is a
//! set of members whose removal lowers conductance, so they are dropped and
//! the loop runs again on the smaller community.
//!
//! ## Termination
//!
//! - **Locally optimal**: the flow reaches `c · v` within the tolerance.
//! - **No progress**: the minimum cut removes nobody.
//! - **Cancelled**: the cancel flag was raised or the time limit passed. The
//!   check happens once per iteration, never inside a flow run.
//! - **Iteration limit**: only when a limit was configured.
//!
//! A seed with no boundary (`c = 0`) stops after exactly one iteration, since
//! every sink arc has zero capacity.
//!
//! ## References
//!
//! Lang, Rao (2004). "A Flow-Based Method for Improving the Expansion or
//! Conductance of Graph Cuts." IPCO 2004, LNCS 3064.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::conductance::{conductance, cut_and_volume};
use super::traits::SelectiveCommunityDetection;
use crate::error::{Error, Result};
use crate::flow::{FlowNetwork, PushRelabel, FLOW_TOLERANCE};
use crate::graph::{degree, validate_seed, weighted_degree, EdgeWeight};

/// Allowed gap between total source and total sink capacity of the local
/// network before it is reported.
const CAPACITY_BALANCE_TOLERANCE: f64 = 1e-4;

/// Why the refinement loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The maximum flow matched `cut * volume`: no subset has lower conductance.
    LocallyOptimal,
    /// The minimum cut removed no member.
    NoProgress,
    /// The cancel flag or time limit fired before an iteration.
    Cancelled,
    /// The configured iteration limit was reached.
    IterationLimit,
}

/// Numerical irregularity observed during refinement.
///
/// These are diagnostics. They are logged and collected but never abort the
/// loop.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericAnomaly {
    /// Conductance went up after a trim.
    ConductanceIncreased {
        /// Iteration that performed the trim.
        iteration: usize,
        /// Conductance before the trim.
        previous: f64,
        /// Conductance after the trim.
        next: f64,
    },
    /// A trim removed members but left conductance exactly unchanged.
    ConductanceUnchanged {
        /// Iteration that performed the trim.
        iteration: usize,
        /// Conductance before and after.
        value: f64,
    },
    /// Source and sink capacities of the local network did not balance.
    CapacityImbalance {
        /// Iteration that built the network.
        iteration: usize,
        /// Total capacity leaving the source.
        at_source: f64,
        /// Total capacity entering the sink.
        at_sink: f64,
    },
    /// The flow fell short of `cut * volume` but the cut removed nobody.
    FlowShortfall {
        /// Iteration of the flow run.
        iteration: usize,
        /// Achieved flow.
        flow: f64,
        /// `cut * volume`.
        expected: f64,
    },
    /// The cut would have removed every member; the trim was not applied.
    EmptiedCommunity {
        /// Iteration of the flow run.
        iteration: usize,
    },
}

/// Outcome of one MQI refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// The refined community.
    pub community: BTreeSet<usize>,
    /// Number of flow iterations started.
    pub iterations: usize,
    /// Why the loop stopped.
    pub termination: Termination,
    /// Conductance of `community`.
    pub conductance: f64,
    /// Diagnostics collected along the way.
    pub anomalies: Vec<NumericAnomaly>,
}

/// MQI local community refinement.
///
/// ```
/// use std::collections::BTreeSet;
/// use petgraph::graph::UnGraph;
/// use flowcut::community::{Mqi, Termination};
///
/// // Triangles {0,1,2} and {3,4,5} joined by the edge 2-3.
/// let mut graph = UnGraph::<(), ()>::new_undirected();
/// let n: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
/// for (a, b) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
///     graph.add_edge(n[a], n[b], ());
/// }
///
/// // Node 3 belongs to the other triangle and gets trimmed.
/// let refined = Mqi::new().refine(&graph, &BTreeSet::from([0, 1, 2, 3])).unwrap();
/// assert_eq!(refined.community, BTreeSet::from([0, 1, 2]));
/// assert_eq!(refined.termination, Termination::LocallyOptimal);
/// ```
#[derive(Debug, Clone)]
pub struct Mqi {
    /// Absolute tolerance for the flow-vs-`cut * volume` test.
    tolerance: f64,
    /// Optional cap on iterations (`None` = run to convergence).
    max_iter: Option<usize>,
    /// Cooperative cancellation flag.
    cancel: Option<Arc<AtomicBool>>,
    /// Wall-clock budget, measured from the start of each refinement.
    time_limit: Option<Duration>,
}

impl Mqi {
    /// Create an MQI refiner with default settings.
    pub fn new() -> Self {
        Self {
            tolerance: FLOW_TOLERANCE,
            max_iter: None,
            cancel: None,
            time_limit: None,
        }
    }

    /// Set the absolute tolerance used to decide local optimality.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Cap the number of iterations.
    pub fn with_max_iter(mut self, max_iter: Option<usize>) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Stop early once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Stop early once `limit` has elapsed since the refinement started.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                message: "must be finite and positive",
            });
        }
        Ok(())
    }

    fn interrupted(&self, deadline: Option<Instant>) -> bool {
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        cancelled || deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Refine `seed` into a community of locally minimal conductance.
    pub fn refine<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        seed: &BTreeSet<usize>,
    ) -> Result<Refinement> {
        self.validate()?;
        validate_seed(graph, seed)?;

        let deadline = self.time_limit.map(|limit| Instant::now() + limit);
        let mut community = seed.clone();
        let mut prev_conductance = conductance(graph, &community);
        let mut anomalies = Vec::new();
        let mut iterations = 0usize;

        let termination = loop {
            if self.interrupted(deadline) {
                break Termination::Cancelled;
            }
            if self.max_iter.is_some_and(|max| iterations >= max) {
                break Termination::IterationLimit;
            }
            iterations += 1;

            let (cut, volume) = cut_and_volume(graph, &community);
            debug!(
                iteration = iterations,
                cut,
                volume,
                size = community.len(),
                "mqi iteration"
            );

            let local = LocalNetwork::build(graph, &community, cut, volume)?;
            if let Some(anomaly) = local.imbalance(iterations) {
                report(&mut anomalies, anomaly);
            }

            let mut max_flow = PushRelabel::new(&local.network, local.source, local.sink)?;
            max_flow.run()?;
            let flow = max_flow.max_flow()?;
            let expected = cut * volume;
            debug!(iteration = iterations, flow, expected, "flow finished");

            if (flow - expected).abs() <= self.tolerance {
                break Termination::LocallyOptimal;
            }

            let removed: Vec<usize> = max_flow
                .source_set()?
                .into_iter()
                .filter(|&x| x < local.local_to_global.len())
                .map(|x| local.local_to_global[x])
                .collect();

            if removed.is_empty() {
                report(
                    &mut anomalies,
                    NumericAnomaly::FlowShortfall {
                        iteration: iterations,
                        flow,
                        expected,
                    },
                );
                break Termination::NoProgress;
            }
            if removed.len() >= community.len() {
                report(
                    &mut anomalies,
                    NumericAnomaly::EmptiedCommunity {
                        iteration: iterations,
                    },
                );
                break Termination::NoProgress;
            }

            debug!(iteration = iterations, removed = removed.len(), "trimming");
            for u in &removed {
                let _ = community.remove(u);
            }

            let next_conductance = conductance(graph, &community);
            if next_conductance > prev_conductance {
                report(
                    &mut anomalies,
                    NumericAnomaly::ConductanceIncreased {
                        iteration: iterations,
                        previous: prev_conductance,
                        next: next_conductance,
                    },
                );
            } else if next_conductance == prev_conductance {
                report(
                    &mut anomalies,
                    NumericAnomaly::ConductanceUnchanged {
                        iteration: iterations,
                        value: next_conductance,
                    },
                );
            }
            prev_conductance = next_conductance;
        };

        let final_conductance = conductance(graph, &community);
        info!(
            iterations,
            ?termination,
            size = community.len(),
            conductance = final_conductance,
            "mqi finished"
        );

        Ok(Refinement {
            community,
            iterations,
            termination,
            conductance: final_conductance,
            anomalies,
        })
    }

    /// Refine several independent seeds.
    ///
    /// Seeds are processed in parallel when the `parallel` feature is enabled.
    /// The first error aborts the batch.
    #[cfg(feature = "parallel")]
    pub fn refine_all<N, E>(
        &self,
        graph: &UnGraph<N, E>,
        seeds: &[BTreeSet<usize>],
    ) -> Result<Vec<Refinement>>
    where
        N: Sync,
        E: EdgeWeight + Sync,
    {
        seeds
            .par_iter()
            .map(|seed| self.refine(graph, seed))
            .collect()
    }

    /// Refine several independent seeds.
    ///
    /// Seeds are processed in parallel when the `parallel` feature is enabled.
    /// The first error aborts the batch.
    #[cfg(not(feature = "parallel"))]
    pub fn refine_all<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        seeds: &[BTreeSet<usize>],
    ) -> Result<Vec<Refinement>> {
        seeds.iter().map(|seed| self.refine(graph, seed)).collect()
    }
}

impl Default for Mqi {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectiveCommunityDetection for Mqi {
    fn expand_one_community<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        seed: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>> {
        self.refine(graph, seed).map(|r| r.community)
    }
}

fn report(anomalies: &mut Vec<NumericAnomaly>, anomaly: NumericAnomaly) {
    warn!(?anomaly, "mqi numeric anomaly");
    anomalies.push(anomaly);
}

/// Per-iteration flow network over the current community.
///
/// Members get local ids `0..k`; the sink is `k` and the source `k + 1`.
struct LocalNetwork {
    network: FlowNetwork,
    local_to_global: Vec<usize>,
    source: usize,
    sink: usize,
    /// Total capacity leaving the source.
    at_source: f64,
    /// Total capacity entering the sink.
    at_sink: f64,
}

impl LocalNetwork {
    fn build<N, E: EdgeWeight>(
        graph: &UnGraph<N, E>,
        community: &BTreeSet<usize>,
        cut: f64,
        volume: f64,
    ) -> Result<Self> {
        let local_to_global: Vec<usize> = community.iter().copied().collect();
        let mut global_to_local: Vec<Option<usize>> = vec![None; graph.node_count()];
        for (local, &global) in local_to_global.iter().enumerate() {
            global_to_local[global] = Some(local);
        }

        let k = local_to_global.len();
        let sink = k;
        let source = k + 1;
        // At most one intra arc per incident edge, plus a source and a sink pair.
        let arcs = local_to_global.iter().map(|&u| degree(graph, u)).sum::<usize>() + 4 * k;
        let mut network = FlowNetwork::with_capacity(k + 2, arcs);
        let mut at_source = 0.0;
        let mut at_sink = 0.0;

        for (u_local, &u) in local_to_global.iter().enumerate() {
            let mut incoming_cut = 0.0;
            for edge in graph.edges(NodeIndex::new(u)) {
                let w = edge.weight().weight();
                match global_to_local[edge.target().index()] {
                    // The opposite arc is added from the other endpoint.
                    Some(v_local) => {
                        let _ = network.add_arc(u_local, v_local, volume)?;
                    }
                    None => incoming_cut += w,
                }
            }

            if incoming_cut > 0.0 {
                at_source += volume * incoming_cut;
                let _ = network.add_arc_pair(source, u_local, volume * incoming_cut, 0.0)?;
            }

            let node_volume = weighted_degree(graph, u, true);
            at_sink += cut * node_volume;
            let _ = network.add_arc_pair(u_local, sink, cut * node_volume, 0.0)?;
        }

        network.index_edges()?;

        Ok(Self {
            network,
            local_to_global,
            source,
            sink,
            at_source,
            at_sink,
        })
    }

    /// Both terminals should carry `cut * volume`.
    fn imbalance(&self, iteration: usize) -> Option<NumericAnomaly> {
        ((self.at_source - self.at_sink).abs() > CAPACITY_BALANCE_TOLERANCE).then_some(
            NumericAnomaly::CapacityImbalance {
                iteration,
                at_source: self.at_source,
                at_sink: self.at_sink,
            },
        )
    }
}
