//! Windowed summaries of the whole graph.
//!
//! A `GraphAggregation` describes a summary that can be built edge by edge and combined across
//! partitions. Each worker folds the edges it holds into one summary per tumbling window, and the
//! closed partial summaries meet through a balanced merge tree, so that every window yields a
//! single summary on worker 0.

use std::cell::RefCell;
use std::rc::Rc;

use timely::dataflow::operators::vec::Map;
use timely::dataflow::{Scope, StreamVec as Stream};

use crate::edge::Edge;
use crate::error::{Error, Result};
use crate::operators::merge_tree::{merge_partials, Combine, TreeShape};
use crate::operators::window::tumbling;
use crate::stream::EdgeStream;
use crate::{ExchangeData, VertexId};

/// A graph summary computed from edges, combinable across workers.
///
/// `combine` should be associative, with `initial()` as its identity; partial summaries are
/// combined in an order that depends on the number of workers.
///
/// # Examples
///
/// ```
/// use graph_stream::{Edge, GraphAggregation};
///
/// /// The largest vertex id seen.
/// struct MaxId;
///
/// impl GraphAggregation<u32, ()> for MaxId {
///     type Summary = u32;
///     type Output = u32;
///     fn initial(&self) -> u32 { 0 }
///     fn update(&mut self, summary: u32, edge: &Edge<u32, ()>) -> u32 {
///         summary.max(edge.source).max(edge.target)
///     }
///     fn combine(&mut self, a: u32, b: u32) -> u32 { a.max(b) }
///     fn transform(&mut self, summary: u32) -> u32 { summary }
/// }
/// ```
pub trait GraphAggregation<K, EV>: 'static {
    /// The combinable partial result.
    type Summary: ExchangeData;
    /// What each window reports.
    type Output: Clone + 'static;

    /// The summary of no edges.
    fn initial(&self) -> Self::Summary;
    /// Adds one edge to a summary.
    fn update(&mut self, summary: Self::Summary, edge: &Edge<K, EV>) -> Self::Summary;
    /// Merges two partial summaries.
    fn combine(&mut self, a: Self::Summary, b: Self::Summary) -> Self::Summary;
    /// Converts a complete summary to the reported output.
    fn transform(&mut self, summary: Self::Summary) -> Self::Output;
}

impl<G, K, EV> EdgeStream<G, K, EV>
where
    G: Scope<Timestamp = u64>,
    K: VertexId,
    EV: ExchangeData,
{
    /// Reports `aggregation` over each tumbling window of `window_ms`.
    ///
    /// Every window with at least one edge produces one output, on worker 0, at the window's last
    /// millisecond. Fails if `window_ms` is zero.
    pub fn aggregate_summary<A>(&self, aggregation: A, window_ms: u64) -> Result<Stream<G, A::Output>>
    where
        A: GraphAggregation<K, EV>,
    {
        if window_ms == 0 {
            return Err(Error::invalid("summary window must be positive"));
        }

        let index = self.scope().index();
        let aggregation = Rc::new(RefCell::new(aggregation));

        let local = Rc::clone(&aggregation);
        let partials = tumbling(
            &self.edges,
            "SummaryPartial",
            window_ms,
            |_edge: &Edge<K, EV>| (),
            move |_: &()| index as u64,
            move |(), _window, edges| {
                let mut local = local.borrow_mut();
                let initial = local.initial();
                let summary = edges.iter().fold(initial, |summary, edge| local.update(summary, edge));
                Some(summary)
            },
        );

        let combining = Rc::clone(&aggregation);
        let combine = Combine(move |a: A::Summary, b: A::Summary| combining.borrow_mut().combine(a, b));
        let merged = merge_partials(&partials, combine, window_ms, TreeShape::Balanced)?;

        Ok(merged.map(move |tagged| aggregation.borrow_mut().transform(tagged.value)))
    }
}
