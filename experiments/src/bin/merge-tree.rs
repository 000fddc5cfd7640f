//! Counts edges per window across all workers, through the merge tree.
//!
//! Usage: `merge-tree <nodes> <edges> [key=value ...] [timely options]`. Reads `merge_window_ms`,
//! `fold_policy`, and `tree_shape`. With `fold_policy=last` each window reports the count of the
//! last partial to arrive rather than the total, which makes the difference between the policies
//! visible. A windowed summary of the same stream is printed alongside.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use timely::dataflow::operators::{Inspect, Probe};
use timely::dataflow::ProbeHandle;

use graph_stream::{Combine, Edge, EdgeInput, FoldPolicy, GraphAggregation, GraphStreamConfig, LastWins};

type Node = u32;

/// The number of edges and the number of self loops in a window.
struct Loops;

impl GraphAggregation<Node, u64> for Loops {
    type Summary = (u64, u64);
    type Output = String;

    fn initial(&self) -> (u64, u64) { (0, 0) }
    fn update(&mut self, (edges, loops): (u64, u64), edge: &Edge<Node, u64>) -> (u64, u64) {
        (edges + 1, loops + if edge.source == edge.target { 1 } else { 0 })
    }
    fn combine(&mut self, a: (u64, u64), b: (u64, u64)) -> (u64, u64) {
        (a.0 + b.0, a.1 + b.1)
    }
    fn transform(&mut self, (edges, loops): (u64, u64)) -> String {
        format!("{} of {} edges are self loops", loops, edges)
    }
}

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
            let window = config.merge_window_ms;
            let shape = config.tree_shape;

            let counts = match config.fold_policy {
                FoldPolicy::Combine => graph.merge_tree_with(|_edge| Some(1u64), Combine(|a: u64, b: u64| a + b), window, shape),
                FoldPolicy::LastWins => graph.merge_tree_with(|_edge| Some(1u64), LastWins(|count: u64| count), window, shape),
            };
            // validated by `GraphStreamConfig::from_args`.
            let counts = counts.expect("merge window is positive");
            counts
                .inspect_batch(|time, counts| println!("window ending {}: {:?}", time + 1, counts))
                .probe_with(&mut probe);

            graph
                .aggregate_summary(Loops, window)
                .expect("merge window is positive")
                .inspect_batch(|time, summaries| println!("window ending {}: {:?}", time + 1, summaries))
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
