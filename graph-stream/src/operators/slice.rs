//! Windowed neighborhoods.
//!
//! `slice` co-locates each vertex with its neighbors by partitioning edges on the vertex they are
//! grouped under, then buffers them into tumbling windows. Each closed window yields one
//! `NeighborWindow` per vertex with edges in the window. Operations on the resulting
//! `GraphWindowStream` run where the window was assembled, without further exchange.

use serde::{Deserialize, Serialize};

use timely::dataflow::operators::vec::Map;
use timely::dataflow::{Scope, StreamVec as Stream};

use crate::edge::{Edge, EdgeDirection, Vertex};
use crate::error::{Error, Result};
use crate::hashable::Hashable;
use crate::operators::window::{tumbling, Window};
use crate::stream::EdgeStream;
use crate::{ExchangeData, VertexId};

/// The edges grouped under one vertex during one window.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeighborWindow<K, EV> {
    /// The vertex the neighbors are grouped under.
    pub vertex: K,
    /// The window the edges arrived in.
    pub window: Window,
    /// Neighbor ids and edge values, in arrival order.
    pub neighbors: Vec<(K, EV)>,
}

impl<K: Clone, EV: Clone> NeighborWindow<K, EV> {
    /// The window's edges, each leaving `vertex`.
    pub fn edges(&self) -> impl Iterator<Item = Edge<K, EV>> + '_ {
        self.neighbors
            .iter()
            .map(move |(neighbor, value)| Edge::new(self.vertex.clone(), neighbor.clone(), value.clone()))
    }
}

/// A stream of per-vertex neighbor windows, produced by `EdgeStream::slice`.
#[derive(Clone)]
pub struct GraphWindowStream<G: Scope, K: 'static, EV: 'static> {
    /// One record per vertex and closed window.
    pub windows: Stream<G, NeighborWindow<K, EV>>,
}

impl<G, K, EV> EdgeStream<G, K, EV>
where
    G: Scope<Timestamp = u64>,
    K: VertexId,
    EV: ExchangeData,
{
    /// Groups edges by vertex into tumbling windows of `window_ms`.
    ///
    /// With `Out` each edge is grouped under its source, with `In` under its target (the edge is
    /// reversed, so neighbors are the sources), and with `All` under both endpoints. Fails if
    /// `window_ms` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use timely::dataflow::operators::{Inspect, ToStream};
    /// use graph_stream::{Edge, EdgeDirection, EdgeStream};
    ///
    /// ::timely::example(|scope| {
    ///     let edges = vec![Edge::new(1u32, 2u32, ()), Edge::new(1, 3, ())].to_stream(scope);
    ///     EdgeStream::new(edges)
    ///         .slice(10, EdgeDirection::Out)
    ///         .unwrap()
    ///         .windows()
    ///         .clone()
    ///         .inspect(|window| assert_eq!(window.neighbors.len(), 2));
    /// });
    /// ```
    pub fn slice(&self, window_ms: u64, direction: EdgeDirection) -> Result<GraphWindowStream<G, K, EV>> {
        if window_ms == 0 {
            return Err(Error::invalid("slice window must be positive"));
        }

        let grouped = match direction {
            EdgeDirection::Out => self.clone(),
            EdgeDirection::In => self.reverse(),
            EdgeDirection::All => self.undirected(),
        };

        let windows = tumbling(
            &grouped.edges,
            "Slice",
            window_ms,
            |edge: &Edge<K, EV>| edge.source.clone(),
            |vertex: &K| vertex.hashed(),
            |vertex, window, edges| {
                let neighbors = edges.into_iter().map(|edge| (edge.target, edge.value)).collect();
                Some(NeighborWindow { vertex, window, neighbors })
            },
        );

        Ok(GraphWindowStream { windows })
    }
}

impl<G, K, EV> GraphWindowStream<G, K, EV>
where
    G: Scope,
    K: VertexId,
    EV: ExchangeData,
{
    /// The underlying stream of neighbor windows.
    pub fn windows(&self) -> &Stream<G, NeighborWindow<K, EV>> {
        &self.windows
    }

    /// Folds each window's neighbors, starting from `init`.
    ///
    /// `fold` receives the accumulator, the vertex, the neighbor, and the edge value.
    pub fn fold_neighbors<T, F>(&self, init: T, mut fold: F) -> Stream<G, Vertex<K, T>>
    where
        T: Clone + 'static,
        F: FnMut(T, &K, &K, &EV) -> T + 'static,
    {
        self.windows.clone().map(move |window| {
            let mut acc = init.clone();
            for (neighbor, value) in window.neighbors.iter() {
                acc = fold(acc, &window.vertex, neighbor, value);
            }
            Vertex::new(window.vertex, acc)
        })
    }

    /// Reduces the values of each window's edges with `reduce`.
    ///
    /// Windows are never empty, so every window produces a value.
    pub fn reduce_on_edges<F>(&self, mut reduce: F) -> Stream<G, Vertex<K, EV>>
    where
        F: FnMut(EV, EV) -> EV + 'static,
    {
        self.windows.clone().flat_map(move |window| {
            let vertex = window.vertex;
            window
                .neighbors
                .into_iter()
                .map(|(_neighbor, value)| value)
                .reduce(&mut reduce)
                .map(|value| Vertex::new(vertex, value))
        })
    }

    /// Applies `logic` to each vertex and its window's neighbors, emitting everything it returns.
    pub fn apply_on_neighbors<T, I, F>(&self, mut logic: F) -> Stream<G, T>
    where
        T: Clone + 'static,
        I: IntoIterator<Item = T>,
        F: FnMut(&K, &[(K, EV)]) -> I + 'static,
    {
        self.windows.clone().flat_map(move |window| logic(&window.vertex, &window.neighbors))
    }
}
