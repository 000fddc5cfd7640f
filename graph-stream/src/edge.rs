//! Edges, vertices, and edge directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A directed edge from `source` to `target` carrying `value`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge<K, EV> {
    /// Identifier of the source vertex.
    pub source: K,
    /// Identifier of the target vertex.
    pub target: K,
    /// Payload carried by the edge.
    pub value: EV,
}

impl<K, EV> Edge<K, EV> {
    /// Creates a new edge.
    pub fn new(source: K, target: K, value: EV) -> Self {
        Edge { source, target, value }
    }

    /// The same edge pointing the other way.
    ///
    /// # Examples
    ///
    /// ```
    /// use graph_stream::Edge;
    ///
    /// let edge = Edge::new(1, 2, "x");
    /// assert_eq!(edge.reverse(), Edge::new(2, 1, "x"));
    /// ```
    pub fn reverse(self) -> Self {
        Edge { source: self.target, target: self.source, value: self.value }
    }
}

impl<K, EV> From<(K, K, EV)> for Edge<K, EV> {
    fn from((source, target, value): (K, K, EV)) -> Self {
        Edge::new(source, target, value)
    }
}

/// A vertex identifier paired with a value, e.g. a degree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vertex<K, VV> {
    /// Identifier of the vertex.
    pub id: K,
    /// Value associated with the vertex.
    pub value: VV,
}

impl<K, VV> Vertex<K, VV> {
    /// Creates a new vertex.
    pub fn new(id: K, value: VV) -> Self {
        Vertex { id, value }
    }
}

/// Which neighbors of a vertex are grouped with it when slicing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    /// Edges pointing at the vertex, keyed by their target.
    In,
    /// Edges leaving the vertex, keyed by their source.
    #[default]
    Out,
    /// Both, by pairing every edge with its reverse.
    All,
}

impl FromStr for EdgeDirection {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "in" => Ok(EdgeDirection::In),
            "out" => Ok(EdgeDirection::Out),
            "all" => Ok(EdgeDirection::All),
            other => Err(Error::invalid(format!("illegal edge direction: {:?}", other))),
        }
    }
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeDirection::In => write!(f, "in"),
            EdgeDirection::Out => write!(f, "out"),
            EdgeDirection::All => write!(f, "all"),
        }
    }
}
