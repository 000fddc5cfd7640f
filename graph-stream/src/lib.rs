//! Streaming graph aggregation over unbounded edge streams.
//!
//! A graph stream is a timely dataflow stream of `Edge<K, EV>` records, spread across workers.
//! Rather than materializing the graph, the operators in this crate maintain small amounts of
//! per-worker state and report continuously updated results: vertex degrees, global vertex and
//! edge counts, windowed neighborhoods, and user defined reductions.
//!
//! Three mechanisms do the interesting work:
//!
//! * `slice` repartitions edges so that a vertex and its neighbors share a worker, and buffers
//!   them into tumbling windows.
//! * `aggregate` and `global_aggregate` keep running per-key (or global) state and emit an update
//!   with every incoming edge, optionally suppressing repeated values.
//! * `merge_tree` combines per-worker partial results over `log2(peers)` levels of windowed
//!   folding, halving the number of participating workers at each level.
//!
//! Logical times are milliseconds (`u64`). Windows close when the input frontier passes their
//! end, so an input must advance (or close) for windowed results to appear.
//!
//! # Examples
//!
//! ```
//! use timely::dataflow::operators::Inspect;
//! use graph_stream::{Edge, EdgeInput};
//!
//! timely::execute_directly(|worker| {
//!
//!     let mut input = EdgeInput::with_timestamps(|edge: &Edge<u32, u64>| edge.value);
//!
//!     worker.dataflow::<u64, _, _>(|scope| {
//!         let graph = input.to_stream(scope);
//!         graph.degrees()
//!              .inspect(|vertex| println!("degree: {:?}", vertex));
//!         graph.number_of_vertices()
//!              .inspect(|count| println!("vertices: {:?}", count));
//!     });
//!
//!     input.send(Edge::new(1, 2, 0));
//!     input.send(Edge::new(2, 3, 1));
//!     input.send(Edge::new(1, 3, 2));
//! });
//! ```

#![forbid(missing_docs)]

use std::hash::Hash;

pub use config::GraphStreamConfig;
pub use edge::{Edge, EdgeDirection, Vertex};
pub use error::{Error, Result};
pub use hashable::Hashable;
pub use input::{EdgeInput, LAST_TIME};
pub use operators::aggregate::{LocalDegrees, VertexReducer};
pub use operators::global::SuppressUnchanged;
pub use operators::merge_tree::{Combine, FoldPolicy, LastWins, Tagged, TreeFold, TreeShape};
pub use operators::slice::{GraphWindowStream, NeighborWindow};
pub use operators::split::DegreeSplitter;
pub use operators::summary::GraphAggregation;
pub use operators::window::Window;
pub use stream::EdgeStream;

pub mod config;
pub mod edge;
pub mod error;
pub mod hashable;
pub mod input;
pub mod operators;
pub mod stream;

/// Data that can move between workers.
pub trait ExchangeData: Clone + timely::ExchangeData {}
impl<T: Clone + timely::ExchangeData> ExchangeData for T {}

/// Vertex identifiers: exchangeable, and usable as partitioning and map keys.
pub trait VertexId: ExchangeData + Hash + Eq {}
impl<T: ExchangeData + Hash + Eq> VertexId for T {}
