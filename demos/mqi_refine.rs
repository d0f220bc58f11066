use std::collections::BTreeSet;

use flowcut::community::{conductance, ClosedNeighborhood, Combined, SelectiveCommunityDetection};
use flowcut::graph::total_edge_weight;
use flowcut::{EdgeScoreThen, Mqi, NeighborhoodJaccard};
use petgraph::graph::UnGraph;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Minimal end-to-end: planted communities -> rough seed -> MQI refinement.

    // Three cliques of five, chained by single bridges 4-5 and 9-10.
    let mut graph = UnGraph::<(), ()>::new_undirected();
    let nodes: Vec<_> = (0..15).map(|_| graph.add_node(())).collect();
    for block in 0..3 {
        for i in 0..5 {
            for j in (i + 1)..5 {
                graph.add_edge(nodes[block * 5 + i], nodes[block * 5 + j], ());
            }
        }
    }
    graph.add_edge(nodes[4], nodes[5], ());
    graph.add_edge(nodes[9], nodes[10], ());

    println!(
        "graph      {} nodes, {} edges, volume {}",
        graph.node_count(),
        graph.edge_count(),
        2.0 * total_edge_weight(&graph)
    );

    // A sloppy seed: the middle clique plus pieces of both neighbours.
    let seed: BTreeSet<usize> = [3, 4, 5, 6, 7, 8, 9, 10].into_iter().collect();
    let refined = Mqi::new().refine(&graph, &seed)?;

    println!(
        "seed       {:?}  conductance {:.4}",
        seed,
        conductance(&graph, &seed)
    );
    println!(
        "refined    {:?}  conductance {:.4}  ({} iterations, {:?})",
        refined.community, refined.conductance, refined.iterations, refined.termination
    );
    for anomaly in &refined.anomalies {
        println!("  anomaly: {anomaly:?}");
    }

    // Same idea as a pipeline: grow a single node, then trim.
    let pipeline = Combined::new(ClosedNeighborhood::new(), Mqi::new());
    println!("from node 9 {:?}", pipeline.expand_from_node(&graph, 9)?);

    // Jaccard reweighting down-weights the bridges before refinement.
    let scored = EdgeScoreThen::new(NeighborhoodJaccard::new(), Mqi::new());
    println!("jaccard    {:?}", scored.expand_one_community(&graph, &seed)?);

    Ok(())
}
