use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use timely::dataflow::operators::capture::Extract;
use timely::dataflow::operators::vec::Map;
use timely::dataflow::operators::{Capture, ToStream};
use timely::Config;

use graph_stream::{Edge, EdgeDirection, EdgeInput, EdgeStream, NeighborWindow, Vertex, LAST_TIME};

type Node = u32;

const WINDOW: u64 = 100;

/// Slices `edges` (valued by their time) with `workers` workers, returning windows by firing time.
fn slice(workers: usize, edges: Vec<Edge<Node, u64>>, direction: EdgeDirection) -> Vec<(u64, Vec<NeighborWindow<Node, u64>>)> {
    let (send, recv) = mpsc::channel();
    let send = Arc::new(Mutex::new(send));

    timely::execute(Config::process(workers), move |worker| {
        let send = send.lock().unwrap().clone();
        let mut input = EdgeInput::with_timestamps(|edge: &Edge<Node, u64>| edge.value);
        worker.dataflow::<u64, _, _>(|scope| {
            input
                .to_stream(scope)
                .slice(WINDOW, direction)
                .unwrap()
                .windows().clone()
                .capture_into(send);
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

fn random_edges(seed: u64, count: u64, nodes: Node) -> Vec<Edge<Node, u64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0 .. count)
        .map(|index| Edge::new(rng.gen_range(0 .. nodes), rng.gen_range(0 .. nodes), index * 3))
        .collect()
}

#[test]
fn out_windows_group_edges_by_source() {
    let edges = random_edges(1, 400, 20);
    let windows = slice(3, edges.clone(), EdgeDirection::Out);

    let mut seen = 0;
    for (time, windows) in windows {
        for window in windows {
            assert_eq!(window.window.size(), WINDOW);
            assert_eq!(time, window.window.max_timestamp());
            for (neighbor, value) in window.neighbors.iter() {
                assert!(window.window.contains(*value));
                assert!(edges.contains(&Edge::new(window.vertex, *neighbor, *value)));
            }
            seen += window.neighbors.len();
        }
    }
    assert_eq!(seen, edges.len());
}

#[test]
fn neighbors_keep_arrival_order() {
    let edges = vec![Edge::new(1, 5, 0), Edge::new(1, 3, 1), Edge::new(1, 4, 2), Edge::new(2, 1, 3)];
    let windows = slice(2, edges, EdgeDirection::Out);
    assert_eq!(windows.len(), 1);

    let (time, windows) = &windows[0];
    assert_eq!(*time, WINDOW - 1);
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].vertex, 1);
    assert_eq!(windows[0].neighbors, vec![(5, 0), (3, 1), (4, 2)]);
    assert_eq!(windows[1].vertex, 2);
}

#[test]
fn in_windows_group_edges_by_target() {
    let edges = vec![Edge::new(1, 9, 0), Edge::new(2, 9, 1), Edge::new(9, 3, 2)];
    let windows = slice(2, edges, EdgeDirection::In);
    let windows: Vec<_> = windows.into_iter().flat_map(|(_time, windows)| windows).collect();

    let nine = windows.iter().find(|window| window.vertex == 9).unwrap();
    assert_eq!(nine.neighbors, vec![(1, 0), (2, 1)]);
    let three = windows.iter().find(|window| window.vertex == 3).unwrap();
    assert_eq!(three.neighbors, vec![(9, 2)]);
    assert!(windows.iter().all(|window| window.vertex != 1 && window.vertex != 2));
}

#[test]
fn all_windows_see_both_directions() {
    let edges = random_edges(2, 250, 15);
    let windows = slice(4, edges.clone(), EdgeDirection::All);
    let entries: usize = windows
        .iter()
        .flat_map(|(_time, windows)| windows.iter())
        .map(|window| window.neighbors.len())
        .sum();
    assert_eq!(entries, 2 * edges.len());
}

#[test]
fn windows_fire_in_time_order() {
    let edges = vec![Edge::new(1, 2, 5), Edge::new(1, 2, 150), Edge::new(1, 3, 420)];
    let times: Vec<u64> = slice(1, edges, EdgeDirection::Out).into_iter().map(|(time, _)| time).collect();
    assert_eq!(times, vec![99, 199, 499]);
}

#[test]
fn edges_at_the_end_of_time_fire_in_the_last_window() {
    let edges = vec![Edge::new(1, 2, u64::MAX - 3), Edge::new(1, 3, u64::MAX)];
    let windows = slice(2, edges, EdgeDirection::Out);
    assert_eq!(windows.len(), 1);

    let (time, windows) = &windows[0];
    assert_eq!(*time, LAST_TIME);
    assert_eq!(windows[0].neighbors, vec![(2, u64::MAX - 3), (3, u64::MAX)]);
}

#[test]
fn zero_windows_are_rejected() {
    timely::example(|scope| {
        let edges = vec![Edge::new(1u32, 2u32, ())].to_stream(scope);
        assert!(EdgeStream::new(edges).slice(0, EdgeDirection::Out).is_err());
    });
}

#[test]
fn unknown_directions_are_rejected() {
    assert!("sideways".parse::<EdgeDirection>().is_err());
}

#[test]
fn window_functions() {
    let edges = vec![Edge::new(1u32, 2u32, 10u64), Edge::new(1, 3, 20), Edge::new(2, 3, 5)];

    let (folded, reduced, applied, rebuilt) = timely::example(move |scope| {
        let windows = EdgeStream::new(edges.to_stream(scope)).slice(WINDOW, EdgeDirection::Out).unwrap();
        let rebuilt = windows.windows.clone().flat_map(|window| window.edges().collect::<Vec<_>>()).capture();
        let folded = windows
            .fold_neighbors(0u64, |acc, _vertex, neighbor, value| acc + (*neighbor as u64) * value)
            .capture();
        let reduced = windows.reduce_on_edges(|a, b| a.max(b)).capture();
        let applied = windows
            .apply_on_neighbors(|vertex, neighbors| neighbors.iter().map(|(n, _)| (*vertex, *n)).collect::<Vec<_>>())
            .map(|(vertex, neighbor)| Vertex::new(vertex, neighbor as u64))
            .capture();
        (folded, reduced, applied, rebuilt)
    });

    let flatten = |captured: Vec<(u64, Vec<Vertex<u32, u64>>)>| -> Vec<Vertex<u32, u64>> {
        captured.into_iter().flat_map(|(_time, data)| data).collect()
    };

    assert_eq!(flatten(folded.extract()), vec![Vertex::new(1, 80), Vertex::new(2, 15)]);
    assert_eq!(flatten(reduced.extract()), vec![Vertex::new(1, 20), Vertex::new(2, 5)]);
    assert_eq!(
        flatten(applied.extract()),
        vec![Vertex::new(1, 2), Vertex::new(1, 3), Vertex::new(2, 3)]
    );
    let rebuilt: Vec<Edge<u32, u64>> = rebuilt.extract().into_iter().flat_map(|(_time, data)| data).collect();
    assert_eq!(rebuilt, vec![Edge::new(1, 2, 10), Edge::new(1, 3, 20), Edge::new(2, 3, 5)]);
}
