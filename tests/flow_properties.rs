//! Max-flow / min-cut properties on random networks.

use std::collections::VecDeque;

use flowcut::flow::{FlowNetwork, PushRelabel, RunState};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random arcs with integer capacities, so flow arithmetic stays exact.
fn random_arcs(seed: u64, n: usize, density: f64) -> Vec<(usize, usize, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut arcs = Vec::new();
    for u in 0..n {
        for v in 0..n {
            if u != v && rng.random_bool(density) {
                arcs.push((u, v, f64::from(rng.random_range(0u32..=10))));
            }
        }
    }
    arcs
}

/// Random arcs with fractional capacities.
fn random_fractional_arcs(seed: u64, n: usize, density: f64) -> Vec<(usize, usize, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut arcs = Vec::new();
    for u in 0..n {
        for v in 0..n {
            if u != v && rng.random_bool(density) {
                arcs.push((u, v, rng.random::<f64>() * 3.7));
            }
        }
    }
    arcs
}

/// `height[u] <= height[v] + 1` on every arc with residual capacity.
fn labels_are_valid(network: &FlowNetwork, flow: &PushRelabel<'_>) -> Result<(), String> {
    let heights = flow.heights().map_err(|e| e.to_string())?;
    let values = flow.flow_vector().map_err(|e| e.to_string())?;
    for e in 0..network.edge_count() {
        let (u, v) = network.endpoints(e).ok_or("missing arc")?;
        let capacity = network.capacity(e).ok_or("missing arc")?;
        if capacity - values[e] > 0.0 && heights[u] > heights[v] + 1 {
            return Err(format!(
                "invalid label on {u}->{v}: {} > {} + 1",
                heights[u], heights[v]
            ));
        }
    }
    Ok(())
}

/// Edmonds-Karp on a dense capacity matrix.
fn reference_max_flow(n: usize, arcs: &[(usize, usize, f64)], s: usize, t: usize) -> f64 {
    let mut residual = vec![vec![0.0f64; n]; n];
    for &(u, v, c) in arcs {
        residual[u][v] += c;
    }
    let mut total = 0.0;
    loop {
        let mut parent = vec![usize::MAX; n];
        parent[s] = s;
        let mut queue = VecDeque::from([s]);
        while let Some(u) = queue.pop_front() {
            for v in 0..n {
                if parent[v] == usize::MAX && residual[u][v] > 0.0 {
                    parent[v] = u;
                    queue.push_back(v);
                }
            }
        }
        if parent[t] == usize::MAX {
            return total;
        }
        let mut bottleneck = f64::INFINITY;
        let mut v = t;
        while v != s {
            let u = parent[v];
            bottleneck = bottleneck.min(residual[u][v]);
            v = u;
        }
        let mut v = t;
        while v != s {
            let u = parent[v];
            residual[u][v] -= bottleneck;
            residual[v][u] += bottleneck;
            v = u;
        }
        total += bottleneck;
    }
}

#[test]
fn four_node_network() {
    // s=0, a=1, b=2, t=3
    let arcs = [
        (0, 1, 3.0),
        (0, 2, 2.0),
        (1, 3, 3.0),
        (2, 3, 2.0),
        (1, 2, 1.0),
    ];
    let network = FlowNetwork::from_arcs(4, &arcs).unwrap();
    let mut flow = PushRelabel::new(&network, 0, 3).unwrap();
    assert_eq!(flow.state(), RunState::Ready);
    flow.run().unwrap();
    assert_eq!(flow.state(), RunState::Finished);

    assert!((flow.max_flow().unwrap() - 5.0).abs() < 1e-12);
    let source_side = flow.source_set().unwrap();
    assert_eq!(source_side[0], 0);
    assert!(!source_side.contains(&3));

    let sink_side = flow.sink_set().unwrap();
    assert_eq!(sink_side[0], 3);
    assert!(!sink_side.contains(&0));
}

#[test]
fn matches_reference_on_fixed_seeds() {
    for seed in 0..20 {
        let arcs = random_arcs(seed, 8, 0.4);
        let network = FlowNetwork::from_arcs(8, &arcs).unwrap();
        let mut flow = PushRelabel::new(&network, 0, 7).unwrap();
        flow.run().unwrap();
        let expected = reference_max_flow(8, &arcs, 0, 7);
        assert_eq!(flow.max_flow().unwrap(), expected, "seed {seed}");
    }
}

proptest! {
    #[test]
    fn max_flow_equals_min_cut(
        seed in any::<u64>(),
        n in 2usize..12,
        density in 0.1f64..0.8,
    ) {
        let arcs = random_arcs(seed, n, density);
        let network = FlowNetwork::from_arcs(n, &arcs).unwrap();
        let mut flow = PushRelabel::new(&network, 0, n - 1).unwrap();
        flow.run().unwrap();
        let value = flow.max_flow().unwrap();

        let mut on_source_side = vec![false; n];
        for u in flow.source_set().unwrap() {
            on_source_side[u] = true;
        }
        prop_assert!(on_source_side[0]);
        prop_assert!(!on_source_side[n - 1]);

        let cut: f64 = (0..network.edge_count())
            .filter(|&e| {
                let (u, v) = network.endpoints(e).unwrap();
                on_source_side[u] && !on_source_side[v]
            })
            .map(|e| network.capacity(e).unwrap())
            .sum();
        prop_assert!((value - cut).abs() < 1e-9, "flow {} cut {}", value, cut);
        prop_assert!((value - reference_max_flow(n, &arcs, 0, n - 1)).abs() < 1e-9);
    }

    #[test]
    fn flow_is_feasible_and_conserved(
        seed in any::<u64>(),
        n in 3usize..12,
        density in 0.1f64..0.8,
    ) {
        let arcs = random_arcs(seed, n, density);
        let network = FlowNetwork::from_arcs(n, &arcs).unwrap();
        let mut flow = PushRelabel::new(&network, 0, n - 1).unwrap();
        flow.run().unwrap();

        let excess = flow.excess().unwrap();
        for (u, &x) in excess.iter().enumerate().take(n - 1).skip(1) {
            prop_assert!(x.abs() < 1e-9, "node {} holds excess {}", u, x);
        }

        let values = flow.flow_vector().unwrap();
        for e in 0..network.edge_count() {
            let capacity = network.capacity(e).unwrap();
            let reverse = network.reverse_of(e).unwrap();
            prop_assert!(values[e] <= capacity + 1e-9);
            prop_assert!((values[e] + values[reverse]).abs() < 1e-9);
        }

        // Everything that left the source arrived at the sink.
        prop_assert!((excess[n - 1] - flow.max_flow().unwrap()).abs() < 1e-9);

        let labels = labels_are_valid(&network, &flow);
        prop_assert!(labels.is_ok(), "{:?}", labels);
    }

    #[test]
    fn fractional_capacities_keep_exact_skew_symmetry(
        seed in any::<u64>(),
        n in 3usize..16,
        density in 0.2f64..0.9,
    ) {
        let arcs = random_fractional_arcs(seed, n, density);
        let network = FlowNetwork::from_arcs(n, &arcs).unwrap();
        let mut flow = PushRelabel::new(&network, 0, n - 1).unwrap();
        flow.run().unwrap();

        let values = flow.flow_vector().unwrap();
        for e in 0..network.edge_count() {
            let reverse = network.reverse_of(e).unwrap();
            prop_assert_eq!(values[e], -values[reverse], "arc {}", e);
        }

        let labels = labels_are_valid(&network, &flow);
        prop_assert!(labels.is_ok(), "{:?}", labels);
        let expected = reference_max_flow(n, &arcs, 0, n - 1);
        prop_assert!((flow.max_flow().unwrap() - expected).abs() < 1e-7);
    }
}
