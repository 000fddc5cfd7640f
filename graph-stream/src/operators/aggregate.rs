//! Incremental per-vertex aggregation.
//!
//! Edges are mapped to vertex events, the events are exchanged by vertex id, and a reducer on
//! each worker folds every arriving event into state it owns and immediately reports the new
//! value. There is no buffering: each input event produces exactly one output event, at the
//! same logical time.

use std::collections::HashMap;
use std::hash::Hash;

use timely::dataflow::channels::pact::Exchange;
use timely::dataflow::operators::vec::Map;
use timely::dataflow::operators::Operator;
use timely::dataflow::{Scope, StreamVec as Stream};

use crate::edge::{Edge, Vertex};
use crate::hashable::Hashable;
use crate::operators::split::DegreeSplitter;
use crate::stream::EdgeStream;
use crate::{ExchangeData, VertexId};

/// Per-worker state folding vertex events into reported vertex values.
///
/// Each worker holds its own reducer, and sees only the vertices routed to it.
pub trait VertexReducer<K, VV>: 'static {
    /// Incorporates `vertex` and returns the vertex's updated value.
    fn reduce(&mut self, vertex: Vertex<K, VV>) -> Vertex<K, VV>;
}

impl<K, VV, F> VertexReducer<K, VV> for F
where
    F: FnMut(Vertex<K, VV>) -> Vertex<K, VV> + 'static,
{
    fn reduce(&mut self, vertex: Vertex<K, VV>) -> Vertex<K, VV> {
        self(vertex)
    }
}

/// Running degrees of the vertices a worker is responsible for.
#[derive(Debug)]
pub struct LocalDegrees<K> {
    degrees: HashMap<K, u64>,
}

impl<K> LocalDegrees<K> {
    /// Creates an empty degree table.
    pub fn new() -> Self {
        LocalDegrees { degrees: HashMap::new() }
    }
}

impl<K> Default for LocalDegrees<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone + 'static> VertexReducer<K, u64> for LocalDegrees<K> {
    fn reduce(&mut self, vertex: Vertex<K, u64>) -> Vertex<K, u64> {
        let degree = self.degrees.entry(vertex.id.clone()).or_insert(0);
        *degree += vertex.value;
        Vertex::new(vertex.id, *degree)
    }
}

impl<G, K, EV> EdgeStream<G, K, EV>
where
    G: Scope,
    K: VertexId,
    EV: ExchangeData,
{
    /// Maps edges to vertex events and folds them, per vertex, with `reducer`.
    ///
    /// Events are exchanged by vertex id so that all events of a vertex meet the same reducer.
    /// Every event produces one output, reporting the reducer's result.
    ///
    /// # Examples
    ///
    /// ```
    /// use timely::dataflow::operators::ToStream;
    /// use graph_stream::{Edge, EdgeStream, Vertex};
    ///
    /// ::timely::example(|scope| {
    ///     let edges = vec![Edge::new(1u32, 2u32, 5u64), Edge::new(1, 3, 7)].to_stream(scope);
    ///
    ///     // the largest weight on an edge leaving each vertex.
    ///     let mut heaviest = std::collections::HashMap::new();
    ///     EdgeStream::new(edges).aggregate(
    ///         |edge: Edge<u32, u64>| Some(Vertex::new(edge.source, edge.value)),
    ///         move |vertex: Vertex<u32, u64>| {
    ///             let max = heaviest.entry(vertex.id).or_insert(0);
    ///             *max = std::cmp::max(*max, vertex.value);
    ///             Vertex::new(vertex.id, *max)
    ///         },
    ///     );
    /// });
    /// ```
    pub fn aggregate<VV, M, I, R>(&self, mapper: M, mut reducer: R) -> Stream<G, Vertex<K, VV>>
    where
        VV: ExchangeData,
        M: FnMut(Edge<K, EV>) -> I + 'static,
        I: IntoIterator<Item = Vertex<K, VV>>,
        R: VertexReducer<K, VV>,
    {
        let exchange = Exchange::new(|vertex: &Vertex<K, VV>| vertex.id.hashed());
        self.edges.clone()
            .flat_map(mapper)
            .unary(exchange, "Aggregate", move |_capability, _info| {
                move |input, output| {
                    input.for_each(|time, data| {
                        output
                            .session(&time)
                            .give_iterator(data.drain(..).map(|vertex| reducer.reduce(vertex)));
                    });
                }
            })
    }

    /// The total degree of each vertex, reported every time it changes.
    pub fn degrees(&self) -> Stream<G, Vertex<K, u64>> {
        self.degrees_with(DegreeSplitter::all())
    }

    /// The in-degree of each vertex, reported every time it changes.
    pub fn in_degrees(&self) -> Stream<G, Vertex<K, u64>> {
        self.degrees_with(DegreeSplitter::in_only())
    }

    /// The out-degree of each vertex, reported every time it changes.
    pub fn out_degrees(&self) -> Stream<G, Vertex<K, u64>> {
        self.degrees_with(DegreeSplitter::out_only())
    }

    /// Degrees counting the edge sides selected by `splitter`.
    pub fn degrees_with(&self, splitter: DegreeSplitter) -> Stream<G, Vertex<K, u64>> {
        self.aggregate(move |edge| splitter.split(&edge), LocalDegrees::new())
    }
}
