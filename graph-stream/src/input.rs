//! Input sessions that stamp edges with logical times.
//!
//! Timely dataflow times in this crate are milliseconds. An `EdgeInput` decides which millisecond
//! each edge belongs to, either from a wall clock started when the input is created (processing
//! time) or from a user supplied extractor (event time), and advances the wrapped timely input so
//! that downstream windows can close.

use std::time::Instant;

use timely::dataflow::operators::Input as TimelyInput;
use timely::dataflow::{InputHandleVec as InputHandle, Scope};

use crate::edge::Edge;
use crate::stream::EdgeStream;
use crate::{ExchangeData, VertexId};

/// The latest time an edge is sent at; `u64::MAX` has no window that reports at or after it.
pub const LAST_TIME: u64 = u64::MAX - 1;

/// How an input assigns times to edges.
enum Clock<K, EV> {
    /// Milliseconds elapsed since the input was created.
    Processing(Instant),
    /// Times read from the edges themselves.
    Event(Box<dyn FnMut(&Edge<K, EV>) -> u64>),
}

/// An input session wrapping a timely input of edges.
///
/// Times never move backwards. Reordering late records is not attempted: an edge whose time is
/// earlier than the session's current time is sent at the current time instead, with a warning.
/// Times past `LAST_TIME` are sent at `LAST_TIME`.
pub struct EdgeInput<K: VertexId, EV: ExchangeData> {
    clock: Clock<K, EV>,
    handle: InputHandle<u64, Edge<K, EV>>,
}

impl<K: VertexId, EV: ExchangeData> EdgeInput<K, EV> {
    /// Creates an input that stamps edges with processing time.
    pub fn new() -> Self {
        EdgeInput {
            clock: Clock::Processing(Instant::now()),
            handle: InputHandle::new(),
        }
    }

    /// Creates an input that stamps edges with the time reported by `extractor`.
    ///
    /// # Examples
    ///
    /// ```
    /// use graph_stream::{Edge, EdgeInput};
    ///
    /// // the edge value is its creation time in milliseconds.
    /// let mut input = EdgeInput::with_timestamps(|edge: &Edge<u32, u64>| edge.value);
    /// input.send(Edge::new(0, 1, 5));
    /// assert_eq!(*input.time(), 5);
    /// ```
    pub fn with_timestamps<F>(extractor: F) -> Self
    where
        F: FnMut(&Edge<K, EV>) -> u64 + 'static,
    {
        EdgeInput {
            clock: Clock::Event(Box::new(extractor)),
            handle: InputHandle::new(),
        }
    }

    /// Introduces the input into `scope` as an edge stream.
    pub fn to_stream<G>(&mut self, scope: &mut G) -> EdgeStream<G, K, EV>
    where
        G: Scope<Timestamp = u64>,
    {
        EdgeStream::new(scope.input_from(&mut self.handle))
    }

    /// Stamps `edge` and sends it into the dataflow.
    pub fn send(&mut self, edge: Edge<K, EV>) {
        let time = match &mut self.clock {
            Clock::Processing(start) => start.elapsed().as_millis() as u64,
            Clock::Event(extractor) => extractor(&edge),
        }
        .min(LAST_TIME);
        let current = *self.handle.time();
        if time < current {
            tracing::warn!(time, current, "late edge sent at the current input time");
        }
        else if time > current {
            self.handle.advance_to(time);
        }
        self.handle.send(edge);
    }

    /// Promises that no further edges will be stamped before `time`.
    ///
    /// Times earlier than the current time are ignored.
    pub fn advance_to(&mut self, time: u64) {
        if *self.handle.time() < time {
            self.handle.advance_to(time);
        }
    }

    /// Advances to the current processing time. Has no effect in event time.
    pub fn tick(&mut self) {
        if let Clock::Processing(start) = &self.clock {
            let now = start.elapsed().as_millis() as u64;
            self.advance_to(now);
        }
    }

    /// Forces buffered edges into the dataflow.
    pub fn flush(&mut self) {
        self.handle.flush();
    }

    /// The time at which the next edge would be sent, at the earliest.
    pub fn time(&self) -> &u64 {
        self.handle.time()
    }

    /// Closes the input, letting all outstanding windows fire.
    pub fn close(self) {
        self.handle.close();
    }
}

impl<K: VertexId, EV: ExchangeData> Default for EdgeInput<K, EV> {
    fn default() -> Self {
        Self::new()
    }
}
