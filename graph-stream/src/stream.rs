//! Edge streams and their record-at-a-time transforms.

use std::collections::{HashMap, HashSet};

use timely::dataflow::channels::pact::Exchange;
use timely::dataflow::operators::vec::{Filter, Map};
use timely::dataflow::operators::{Concat, Operator};
use timely::dataflow::{Scope, StreamVec as Stream};

use crate::edge::{Edge, Vertex};
use crate::hashable::Hashable;
use crate::operators::split::endpoints;
use crate::{ExchangeData, VertexId};

/// An unbounded stream of directed edges, partitioned across workers.
#[derive(Clone)]
pub struct EdgeStream<G: Scope, K: 'static, EV: 'static> {
    /// The underlying timely stream of edges.
    pub edges: Stream<G, Edge<K, EV>>,
}

impl<G, K, EV> EdgeStream<G, K, EV>
where
    G: Scope,
    K: VertexId,
    EV: ExchangeData,
{
    /// Wraps a timely stream of edges.
    pub fn new(edges: Stream<G, Edge<K, EV>>) -> Self {
        EdgeStream { edges }
    }

    /// The underlying stream of edges.
    pub fn edges(&self) -> &Stream<G, Edge<K, EV>> {
        &self.edges
    }

    /// The scope containing the stream.
    pub fn scope(&self) -> G {
        self.edges.scope()
    }

    /// Each vertex the first time it appears as either endpoint of an edge.
    ///
    /// Vertices are partitioned by id, and each worker remembers the ids it has reported.
    pub fn vertices(&self) -> Stream<G, Vertex<K, ()>> {
        let exchange = Exchange::new(|vertex: &Vertex<K, ()>| vertex.id.hashed());
        self.edges.clone()
            .flat_map(endpoints)
            .unary(exchange, "Vertices", |_capability, _info| {
                let mut seen = HashSet::new();
                move |input, output| {
                    input.for_each(|time, data| {
                        let mut session = output.session(&time);
                        for vertex in data.drain(..) {
                            if seen.insert(vertex.id.clone()) {
                                session.give(vertex);
                            }
                        }
                    });
                }
            })
    }

    /// Replaces each edge's value with `logic(&edge)`.
    pub fn map_edges<NV, L>(&self, mut logic: L) -> EdgeStream<G, K, NV>
    where
        NV: ExchangeData,
        L: FnMut(&Edge<K, EV>) -> NV + 'static,
    {
        EdgeStream::new(self.edges.clone().map(move |edge| {
            let value = logic(&edge);
            Edge::new(edge.source, edge.target, value)
        }))
    }

    /// Retains edges whose source and target both satisfy `predicate`.
    pub fn filter_vertices<P>(&self, predicate: P) -> Self
    where
        P: Fn(&K) -> bool + 'static,
    {
        EdgeStream::new(self.edges.clone().filter(move |edge| predicate(&edge.source) && predicate(&edge.target)))
    }

    /// Retains edges satisfying `predicate`.
    pub fn filter_edges<P>(&self, predicate: P) -> Self
    where
        P: Fn(&Edge<K, EV>) -> bool + 'static,
    {
        EdgeStream::new(self.edges.clone().filter(predicate))
    }

    /// Drops every edge whose `(source, target)` pair has been seen before.
    ///
    /// Edges are partitioned by source, and each worker keeps the set of targets seen for each of
    /// its sources. The first value seen for a pair is the one kept.
    pub fn distinct(&self) -> Self {
        let exchange = Exchange::new(|edge: &Edge<K, EV>| edge.source.hashed());
        EdgeStream::new(self.edges.clone().unary(exchange, "Distinct", |_capability, _info| {
            let mut neighbors: HashMap<K, HashSet<K>> = HashMap::new();
            move |input, output| {
                input.for_each(|time, data| {
                    let mut session = output.session(&time);
                    for edge in data.drain(..) {
                        let targets = neighbors.entry(edge.source.clone()).or_default();
                        if targets.insert(edge.target.clone()) {
                            session.give(edge);
                        }
                    }
                });
            }
        }))
    }

    /// Reverses the direction of every edge.
    pub fn reverse(&self) -> Self {
        EdgeStream::new(self.edges.clone().map(Edge::reverse))
    }

    /// Merges this stream with `other`.
    pub fn union(&self, other: &Self) -> Self {
        EdgeStream::new(self.edges.clone().concat(other.edges.clone()))
    }

    /// Each edge together with its reverse.
    pub fn undirected(&self) -> Self {
        EdgeStream::new(self.edges.clone().flat_map(|edge| {
            let reversed = Edge::new(edge.target.clone(), edge.source.clone(), edge.value.clone());
            [edge, reversed]
        }))
    }
}

