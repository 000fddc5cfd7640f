//! Reports the number of vertices and edges of a random edge stream.
//!
//! Usage: `counts <nodes> <edges> [key=value ...] [timely options]`. The vertex count honors
//! `suppress_unchanged`; counts are printed by worker 0 as they change.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use timely::dataflow::operators::{Inspect, Probe};
use timely::dataflow::ProbeHandle;

use graph_stream::{DegreeSplitter, Edge, EdgeInput, GraphStreamConfig, Vertex};

type Node = u32;

fn main() -> Result<(), String> {

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let nodes: Node = std::env::args().nth(1).ok_or("must supply a node count")?.parse().map_err(|e| format!("{:?}", e))?;
    let edges: usize = std::env::args().nth(2).ok_or("must supply an edge count")?.parse().map_err(|e| format!("{:?}", e))?;
    let config = GraphStreamConfig::from_args(std::env::args().skip(3)).map_err(|e| e.to_string())?;

    timely::execute_from_args(std::env::args().skip(3), move |worker| {

        let index = worker.index();
        let peers = worker.peers();

        let mut input = EdgeInput::with_timestamps(|edge: &Edge<Node, u64>| edge.value);
        let mut probe = ProbeHandle::new();

        worker.dataflow::<u64, _, _>(|scope| {
            let graph = input.to_stream(scope);

            let splitter = DegreeSplitter::all();
            let mut seen = HashSet::new();
            graph
                .global_aggregate(
                    move |edge| splitter.split(&edge),
                    move |vertex: Vertex<Node, u64>| {
                        seen.insert(vertex.id);
                        Some(seen.len() as u64)
                    },
                    config.suppress_unchanged,
                )
                .inspect(|count| println!("vertices: {}", count))
                .probe_with(&mut probe);

            graph
                .number_of_edges()
                .inspect(|count| println!("edges: {}", count))
                .probe_with(&mut probe);
        });

        let mut rng = StdRng::seed_from_u64(index as u64);
        for millis in 0 .. (edges / peers) + if index < (edges % peers) { 1 } else { 0 } {
            input.send(Edge::new(rng.gen_range(0 .. nodes), rng.gen_range(0 .. nodes), millis as u64));
        }
        input.flush();
        worker.step_while(|| probe.less_than(input.time()));
    })?;

    Ok(())
}
