use flowcut::flow::{FlowNetwork, PushRelabel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Classic textbook network (CLRS fig. 26.1): s=0, t=5, max flow 23.
    let arcs = [
        (0, 1, 16.0),
        (0, 2, 13.0),
        (1, 3, 12.0),
        (2, 1, 4.0),
        (2, 4, 14.0),
        (3, 2, 9.0),
        (3, 5, 20.0),
        (4, 3, 7.0),
        (4, 5, 4.0),
    ];
    let network = FlowNetwork::from_arcs(6, &arcs)?;

    let mut flow = PushRelabel::new(&network, 0, 5)?;
    flow.run()?;

    println!("max flow   {}", flow.max_flow()?);
    println!("source set {:?}", flow.source_set()?);
    println!("sink set   {:?}", flow.sink_set()?);
    for &(u, v, capacity) in &arcs {
        println!("  {u} -> {v}: {:>4} / {capacity}", flow.flow_between(u, v)?);
    }

    let stats = flow.stats();
    println!(
        "pushes {} relabels {} global relabels {} discharges {}",
        stats.pushes, stats.relabels, stats.global_relabels, stats.discharges
    );
    Ok(())
}
