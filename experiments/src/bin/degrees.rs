//! Maintains vertex degrees over a random edge stream.
//!
//! Usage: `degrees <nodes> <edges> [key=value ...] [timely options]`, with `inspect` to print every
//! degree update. Each worker generates its share of the edges, one millisecond apart.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use timely::dataflow::operators::{Inspect, Probe};
use timely::dataflow::ProbeHandle;

use graph_stream::{Edge, EdgeInput, GraphStreamConfig};

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

        let timer = std::time::Instant::now();
        let index = worker.index();
        let peers = worker.peers();

        let mut input = EdgeInput::with_timestamps(|edge: &Edge<Node, u64>| edge.value);
        let mut probe = ProbeHandle::new();

        worker.dataflow::<u64, _, _>(|scope| {
            input
                .to_stream(scope)
                .degrees_with(config.splitter())
                .inspect(move |vertex| if inspect { println!("degree: {:?}", vertex) })
                .probe_with(&mut probe);
        });

        let mut rng = StdRng::seed_from_u64(index as u64);
        for millis in 0 .. (edges / peers) + if index < (edges % peers) { 1 } else { 0 } {
            input.send(Edge::new(rng.gen_range(0 .. nodes), rng.gen_range(0 .. nodes), millis as u64));
            if millis % 1000 == 999 {
                input.flush();
                worker.step_while(|| probe.less_than(input.time()));
            }
        }

        tracing::info!(worker = index, elapsed = ?timer.elapsed(), "edges loaded");
    })?;

    Ok(())
}
