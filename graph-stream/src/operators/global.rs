//! Globally ordered aggregates computed by a single owner worker.
//!
//! Vertex and edge counts must be reported in one total order to be meaningful, so every record
//! that contributes to them is sent to one worker, `GLOBAL_OWNER`, and all of the aggregation runs
//! there. This gives up data parallelism for these stages; the outputs are small scalar streams,
//! while the edge stream itself stays partitioned.

use std::collections::HashSet;

use timely::dataflow::channels::pact::Pipeline;
use timely::dataflow::operators::vec::Map;
use timely::dataflow::operators::{Exchange, Operator};
use timely::dataflow::{Scope, StreamVec as Stream};

use crate::edge::{Edge, Vertex};
use crate::operators::split::DegreeSplitter;
use crate::stream::EdgeStream;
use crate::{ExchangeData, VertexId};

/// Index of the worker that owns global aggregates.
pub const GLOBAL_OWNER: usize = 0;

/// Routes every record of `stream` to `GLOBAL_OWNER`.
pub(crate) fn to_owner<G: Scope, D: ExchangeData>(stream: &Stream<G, D>) -> Stream<G, D> {
    stream.clone().exchange(|_| GLOBAL_OWNER as u64)
}

/// Admits a value only if it differs from the previously admitted value.
///
/// # Examples
///
/// ```
/// use graph_stream::SuppressUnchanged;
///
/// let mut filter = SuppressUnchanged::new();
/// let kept = [1, 1, 2, 2, 2, 3].into_iter().filter(|x| filter.accept(x)).collect::<Vec<_>>();
/// assert_eq!(kept, vec![1, 2, 3]);
/// ```
#[derive(Debug)]
pub struct SuppressUnchanged<V> {
    previous: Option<V>,
}

impl<V: PartialEq + Clone> SuppressUnchanged<V> {
    /// A filter that has admitted nothing, and so admits anything next.
    pub fn new() -> Self {
        SuppressUnchanged { previous: None }
    }

    /// Returns true, and remembers `value`, if `value` differs from the last admitted value.
    pub fn accept(&mut self, value: &V) -> bool {
        if self.previous.as_ref() == Some(value) {
            false
        }
        else {
            self.previous = Some(value.clone());
            true
        }
    }
}

impl<V: PartialEq + Clone> Default for SuppressUnchanged<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops each record equal to the last record passed on, in arrival order.
pub(crate) fn suppress_unchanged<G, D>(stream: &Stream<G, D>) -> Stream<G, D>
where
    G: Scope,
    D: Clone + 'static + PartialEq,
{
    stream.clone().unary(Pipeline, "SuppressUnchanged", |_capability, _info| {
        let mut filter = SuppressUnchanged::new();
        move |input, output| {
            input.for_each(|time, data| {
                let mut session = output.session(&time);
                for value in data.drain(..) {
                    if filter.accept(&value) {
                        session.give(value);
                    }
                }
            });
        }
    })
}

impl<G, K, EV> EdgeStream<G, K, EV>
where
    G: Scope,
    K: VertexId,
    EV: ExchangeData,
{
    /// Aggregates the whole stream into one totally ordered sequence of values.
    ///
    /// Edges are routed to a single worker, mapped to vertex events by `mapper`, and reduced to
    /// values by `reducer`, which sees every vertex event of the stream. With
    /// `suppress_unchanged` set, a value equal to the previously reported one is dropped.
    /// Only the owning worker produces output.
    pub fn global_aggregate<VV, S, M, I, R, J>(&self, mapper: M, reducer: R, suppress_unchanged: bool) -> Stream<G, S>
    where
        VV: Clone + 'static,
        S: Clone + 'static + PartialEq,
        M: FnMut(Edge<K, EV>) -> I + 'static,
        I: IntoIterator<Item = Vertex<K, VV>>,
        R: FnMut(Vertex<K, VV>) -> J + 'static,
        J: IntoIterator<Item = S>,
    {
        let values = to_owner(&self.edges)
            .flat_map(mapper)
            .flat_map(reducer);

        if suppress_unchanged {
            self::suppress_unchanged(&values)
        }
        else {
            values
        }
    }

    /// The number of distinct vertices seen so far, reported whenever it grows.
    pub fn number_of_vertices(&self) -> Stream<G, u64> {
        let splitter = DegreeSplitter::all();
        let mut vertices = HashSet::new();
        self.global_aggregate(
            move |edge| splitter.split(&edge),
            move |vertex: Vertex<K, u64>| {
                vertices.insert(vertex.id);
                Some(vertices.len() as u64)
            },
            true,
        )
    }

    /// The number of edges seen so far, duplicates included, reported for every edge.
    pub fn number_of_edges(&self) -> Stream<G, u64> {
        let mut edges = 0u64;
        to_owner(&self.edges).map(move |_edge| {
            edges += 1;
            tracing::trace!(edges, "edge counted");
            edges
        })
    }
}
