//! Reports the largest neighborhood in each window of a random edge stream.
//!
//! Usage: `slice <nodes> <edges> [key=value ...] [timely options]`. Reads `window_ms` and
//! `direction`; with `inspect`, every vertex's neighborhood size is printed too.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use timely::dataflow::operators::{Inspect, Probe};
use timely::dataflow::ProbeHandle;

use graph_stream::{Edge, EdgeInput, GraphStreamConfig, Vertex};

type Node = u32;

fn main() -> Result<(), String> {

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let nodes: Node = std::env::args().nth(1).ok_or("must supply a node count")?.parse().map_err(|e| format!("{:?}", e))?;
    let edges: usize = std::env::args().nth(2).ok_or("must supply an edge count")?.parse().map_err(|e| format!("{:?}", e))?;
    let inspect = std::env::args().any(|x| x == "inspect");
    let config = GraphStreamConfig::from_args(std::env::args().skip(3)).map_err(|e| e.to_string())?;

    timely::execute_from_args(std::env::args().skip(3), move |worker| {

        let index = worker.index();
        let peers = worker.peers();

        let mut input = EdgeInput::with_timestamps(|edge: &Edge<Node, u64>| edge.value);
        let mut probe = ProbeHandle::new();

        worker.dataflow::<u64, _, _>(|scope| {
            let windows = input
                .to_stream(scope)
                .slice(config.window_ms, config.direction)
                .expect("window is positive");

            windows
                .fold_neighbors(0u64, |count, _vertex, _neighbor, _value| count + 1)
                .inspect(move |vertex: &Vertex<Node, u64>| if inspect { println!("neighbors: {:?}", vertex) })
                .inspect_batch(move |time, sizes| {
                    if let Some(largest) = sizes.iter().max_by_key(|vertex| vertex.value) {
                        println!("worker {}, window ending {}: largest neighborhood {:?}", index, time + 1, largest);
                    }
                })
                .probe_with(&mut probe);
        });

        let mut rng = StdRng::seed_from_u64(index as u64);
        for millis in 0 .. (edges / peers) + if index < (edges % peers) { 1 } else { 0 } {
            input.send(Edge::new(rng.gen_range(0 .. nodes), rng.gen_range(0 .. nodes), millis as u64));
        }
        input.close();
        while worker.step() { }
    })?;

    Ok(())
}
