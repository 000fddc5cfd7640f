use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use timely::dataflow::operators::capture::Extract;
use timely::dataflow::operators::Capture;
use timely::Config;

use graph_stream::{DegreeSplitter, Edge, EdgeInput, Vertex};

type Node = u32;

/// Which global count a test observes.
#[derive(Copy, Clone)]
enum Count {
    Vertices,
    Edges,
    UndirectedEdges,
    VertexEvents,
}

/// Runs a global count over `edges`, returning every reported value in time order.
fn count(workers: usize, edges: Vec<Edge<Node, u64>>, which: Count) -> Vec<(u64, Vec<u64>)> {
    let (send, recv) = mpsc::channel();
    let send = Arc::new(Mutex::new(send));

    timely::execute(Config::process(workers), move |worker| {
        let send = send.lock().unwrap().clone();
        let mut input = EdgeInput::with_timestamps(|edge: &Edge<Node, u64>| edge.value);
        worker.dataflow::<u64, _, _>(|scope| {
            let graph = input.to_stream(scope);
            let counts = match which {
                Count::Vertices => graph.number_of_vertices(),
                Count::Edges => graph.number_of_edges(),
                Count::UndirectedEdges => graph.undirected().number_of_edges(),
                Count::VertexEvents => {
                    let splitter = DegreeSplitter::all();
                    let mut events = 0u64;
                    graph.global_aggregate(
                        move |edge| splitter.split(&edge),
                        move |_vertex: Vertex<Node, u64>| {
                            events += 1;
                            Some(events / 2)
                        },
                        false,
                    )
                }
            };
            counts.capture_into(send);
        });
        if worker.index() == 0 {
            for edge in edges.iter().cloned() {
                input.send(edge);
            }
        }
    })
    .unwrap()
    .join();

    recv.extract()
}

fn values(reports: Vec<(u64, Vec<u64>)>) -> Vec<u64> {
    reports.into_iter().flat_map(|(_time, values)| values).collect()
}

fn random_edges(seed: u64, count: u64, nodes: Node) -> Vec<Edge<Node, u64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0 .. count)
        .map(|time| Edge::new(rng.gen_range(0 .. nodes), rng.gen_range(0 .. nodes), time))
        .collect()
}

#[test]
fn vertex_count_grows_to_distinct_ids() {
    let edges = random_edges(7, 500, 100);
    let distinct: HashSet<Node> = edges.iter().flat_map(|e| [e.source, e.target]).collect();

    let reports = count(3, edges, Count::Vertices);
    let values = values(reports.clone());

    // suppressed to exactly one report per new vertex.
    assert_eq!(values, (1 ..= distinct.len() as u64).collect::<Vec<_>>());

    // non-decreasing across times as well as within them.
    let maxima: Vec<u64> = reports.iter().map(|(_time, values)| values[values.len() - 1]).collect();
    assert!(maxima.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn edge_count_includes_duplicates() {
    let edges = vec![Edge::new(1, 2, 0), Edge::new(1, 2, 1), Edge::new(1, 2, 1), Edge::new(2, 1, 5)];
    assert_eq!(values(count(2, edges, Count::Edges)), vec![1, 2, 3, 4]);
}

#[test]
fn edge_count_is_reported_at_arrival_times() {
    let edges = vec![Edge::new(1, 2, 0), Edge::new(2, 3, 10), Edge::new(3, 4, 10)];
    let reports = count(2, edges, Count::Edges);
    assert_eq!(reports, vec![(0, vec![1]), (10, vec![2, 3])]);
}

#[test]
fn undirected_streams_have_twice_the_edges() {
    let edges = random_edges(11, 300, 40);
    let reports = values(count(4, edges, Count::UndirectedEdges));
    assert_eq!(reports.len(), 600);
    assert_eq!(reports.last(), Some(&600));
}

#[test]
fn unsuppressed_aggregates_report_every_event() {
    let edges = random_edges(13, 100, 10);
    let reports = values(count(2, edges, Count::VertexEvents));
    assert_eq!(reports.len(), 200);
    // consecutive events may share a value, and none are dropped.
    assert_eq!(reports.last(), Some(&100));
}

#[test]
fn empty_streams_report_nothing() {
    assert!(count(2, Vec::new(), Count::Vertices).is_empty());
    assert!(count(2, Vec::new(), Count::Edges).is_empty());
}
