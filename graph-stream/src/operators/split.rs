//! Splitting edges into vertex events.

use smallvec::SmallVec;

use crate::edge::{Edge, Vertex};

/// Turns each edge into zero, one, or two unit vertex events for degree counting.
///
/// With `collect_out` the source receives `+1`, with `collect_in` the target does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DegreeSplitter {
    /// Emit an event for the target of each edge.
    pub collect_in: bool,
    /// Emit an event for the source of each edge.
    pub collect_out: bool,
}

impl DegreeSplitter {
    /// A splitter with the given collection flags.
    pub fn new(collect_in: bool, collect_out: bool) -> Self {
        DegreeSplitter { collect_in, collect_out }
    }

    /// Both endpoints, for total degrees.
    pub fn all() -> Self { Self::new(true, true) }
    /// Targets only, for in-degrees.
    pub fn in_only() -> Self { Self::new(true, false) }
    /// Sources only, for out-degrees.
    pub fn out_only() -> Self { Self::new(false, true) }

    /// The vertex events for `edge`, source side first.
    ///
    /// # Examples
    ///
    /// ```
    /// use graph_stream::{DegreeSplitter, Edge, Vertex};
    ///
    /// let events = DegreeSplitter::all().split(&Edge::new(1, 2, ()));
    /// assert_eq!(events.as_slice(), &[Vertex::new(1, 1), Vertex::new(2, 1)]);
    /// ```
    pub fn split<K: Clone, EV>(&self, edge: &Edge<K, EV>) -> SmallVec<[Vertex<K, u64>; 2]> {
        let mut events = SmallVec::new();
        if self.collect_out {
            events.push(Vertex::new(edge.source.clone(), 1));
        }
        if self.collect_in {
            events.push(Vertex::new(edge.target.clone(), 1));
        }
        events
    }
}

/// Both endpoints of an edge, as vertices without values.
pub(crate) fn endpoints<K, EV>(edge: Edge<K, EV>) -> [Vertex<K, ()>; 2] {
    [Vertex::new(edge.source, ()), Vertex::new(edge.target, ())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_select_sides() {
        let edge = Edge::new("a", "b", 0.5);
        assert!(DegreeSplitter::new(false, false).split(&edge).is_empty());
        assert_eq!(DegreeSplitter::out_only().split(&edge).as_slice(), &[Vertex::new("a", 1)]);
        assert_eq!(DegreeSplitter::in_only().split(&edge).as_slice(), &[Vertex::new("b", 1)]);
        assert_eq!(DegreeSplitter::all().split(&edge).len(), 2);
    }

    #[test]
    fn self_loops_count_twice() {
        let edge = Edge::new(4, 4, ());
        let events = DegreeSplitter::all().split(&edge);
        assert_eq!(events.as_slice(), &[Vertex::new(4, 1), Vertex::new(4, 1)]);
    }
}
