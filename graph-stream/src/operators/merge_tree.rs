//! Hierarchical reduction of per-worker partial results.
//!
//! Every worker starts with values tagged by its own index. At each level of the tree, values are
//! routed to the worker named by their group key, buffered for one tumbling window, folded, and
//! re-tagged with the group key. The number of distinct tags roughly halves at each level, so after
//! `log2(peers)` levels all surviving values are tagged `0` and live on worker 0.
//!
//! At `level`, a value produced by worker `w` belongs to group `w >> (level + 1)`. Survivors carry
//! the group key of the previous level, so each level groups the current tag by `tag >> 1`. The two
//! shapes differ only in the number of levels: `Shifted` runs `floor(log2(peers))` of them, which
//! reaches tag `0` for a power-of-two number of workers, and `Balanced` runs
//! `ceil(log2(peers))`, which reaches tag `0` for any number of workers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use timely::dataflow::operators::vec::Map;
use timely::dataflow::{Scope, StreamVec as Stream};

use crate::edge::Edge;
use crate::error::{Error, Result};
use crate::operators::window::tumbling;
use crate::stream::EdgeStream;
use crate::{ExchangeData, VertexId};

/// The group the values of worker `tag` belong to at `level`: `tag >> (level + 1)`.
///
/// # Examples
///
/// ```
/// use graph_stream::operators::merge_tree::group_key;
///
/// assert_eq!([0, 1, 2, 3].map(|tag| group_key(tag, 0)), [0, 0, 1, 1]);
/// assert_eq!([0, 1, 2, 3, 4, 5, 6, 7].map(|tag| group_key(tag, 1)), [0, 0, 0, 0, 1, 1, 1, 1]);
/// ```
pub fn group_key(tag: usize, level: usize) -> usize {
    tag.checked_shr((level + 1) as u32).unwrap_or(0)
}

/// A partial result and the tag of the worker group that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tagged<T> {
    /// Worker index at level zero, group key afterwards.
    pub tag: usize,
    /// The partial result.
    pub value: T,
}

impl<T> Tagged<T> {
    /// Tags `value` with `tag`.
    pub fn new(tag: usize, value: T) -> Self {
        Tagged { tag, value }
    }
}

/// How the grouping of tags evolves from level to level.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeShape {
    /// `floor(log2(peers))` levels.
    #[default]
    Shifted,
    /// `ceil(log2(peers))` levels.
    Balanced,
}

impl TreeShape {
    /// Number of reduction levels for `peers` workers.
    pub fn levels(&self, peers: usize) -> usize {
        if peers <= 1 {
            return 0;
        }
        match self {
            TreeShape::Shifted => peers.ilog2() as usize,
            TreeShape::Balanced => peers.next_power_of_two().ilog2() as usize,
        }
    }

    /// The tags surviving each level, starting from one tag per worker.
    ///
    /// # Examples
    ///
    /// ```
    /// use graph_stream::TreeShape;
    ///
    /// assert_eq!(TreeShape::Shifted.plan(4), vec![vec![0, 1], vec![0]]);
    /// assert_eq!(TreeShape::Shifted.plan(8), vec![vec![0, 1, 2, 3], vec![0, 1], vec![0]]);
    /// assert_eq!(TreeShape::Balanced.plan(3), vec![vec![0, 1], vec![0]]);
    /// assert!(TreeShape::Shifted.plan(1).is_empty());
    /// ```
    pub fn plan(&self, peers: usize) -> Vec<Vec<usize>> {
        (0..self.levels(peers))
            .map(|level| {
                let mut tags: Vec<usize> = (0..peers).map(|tag| group_key(tag, level)).collect();
                tags.dedup();
                tags
            })
            .collect()
    }
}

impl FromStr for TreeShape {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        match text.to_ascii_lowercase().as_str() {
            "shifted" => Ok(TreeShape::Shifted),
            "balanced" => Ok(TreeShape::Balanced),
            other => Err(Error::invalid(format!("unknown tree shape: {:?}", other))),
        }
    }
}

impl fmt::Display for TreeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeShape::Shifted => write!(f, "shifted"),
            TreeShape::Balanced => write!(f, "balanced"),
        }
    }
}

/// Names the two folding strategies, for selecting one from configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoldPolicy {
    /// See `LastWins`.
    #[serde(rename = "last")]
    LastWins,
    /// See `Combine`.
    #[default]
    #[serde(rename = "combine")]
    Combine,
}

impl FromStr for FoldPolicy {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        match text.to_ascii_lowercase().as_str() {
            "last" | "last_wins" => Ok(FoldPolicy::LastWins),
            "combine" => Ok(FoldPolicy::Combine),
            other => Err(Error::invalid(format!("unknown fold policy: {:?}", other))),
        }
    }
}

impl fmt::Display for FoldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldPolicy::LastWins => write!(f, "last"),
            FoldPolicy::Combine => write!(f, "combine"),
        }
    }
}

/// Folds the values one group buffered during a window.
///
/// `fold` is called once per buffered value, in arrival order, with the result of the previous
/// call (`None` for the first value). The last result is the group's output for the window.
pub trait TreeFold<T>: 'static {
    /// Folds `value` into `acc`.
    fn fold(&mut self, acc: Option<T>, value: T) -> T;
}

/// Maps every value with a unary function and keeps only the last result.
///
/// Earlier values of the window are discarded.
pub struct LastWins<F>(pub F);

impl<T, F: FnMut(T) -> T + 'static> TreeFold<T> for LastWins<F> {
    fn fold(&mut self, _acc: Option<T>, value: T) -> T {
        (self.0)(value)
    }
}

/// Combines all values of a window with a binary function.
pub struct Combine<F>(pub F);

impl<T, F: FnMut(T, T) -> T + 'static> TreeFold<T> for Combine<F> {
    fn fold(&mut self, acc: Option<T>, value: T) -> T {
        match acc {
            Some(acc) => (self.0)(acc, value),
            None => value,
        }
    }
}

/// Tags `partials` with the producing worker and reduces them through the tree.
pub(crate) fn merge_partials<G, T, L>(
    partials: &Stream<G, T>,
    fold: L,
    window_ms: u64,
    shape: TreeShape,
) -> Result<Stream<G, Tagged<T>>>
where
    G: Scope<Timestamp = u64>,
    T: ExchangeData,
    L: TreeFold<T>,
{
    if window_ms == 0 {
        return Err(Error::invalid("merge tree window must be positive"));
    }

    let scope = partials.scope();
    let index = scope.index();
    let peers = scope.peers();
    let levels = shape.levels(peers);
    if !peers.is_power_of_two() {
        tracing::warn!(peers, %shape, levels, "merge tree over a non-power-of-two number of workers");
    }

    let fold = Rc::new(RefCell::new(fold));
    let mut tagged = partials.clone().map(move |value| Tagged::new(index, value));
    for level in 0..levels {
        let fold = Rc::clone(&fold);
        tagged = tumbling(
            &tagged,
            &format!("MergeTreeLevel{}", level),
            window_ms,
            // tags entering `level` are `group_key(worker, level - 1)`, or worker indices.
            |record: &Tagged<T>| record.tag >> 1,
            |group: &usize| *group as u64,
            move |group, window, records| {
                tracing::debug!(level, group, start = window.start, values = records.len(), "merge tree level folded");
                let mut fold = fold.borrow_mut();
                let mut acc = None;
                for record in records {
                    acc = Some(fold.fold(acc, record.value));
                }
                acc.map(|value| Tagged::new(group, value))
            },
        );
    }
    Ok(tagged)
}

impl<G, K, EV> EdgeStream<G, K, EV>
where
    G: Scope<Timestamp = u64>,
    K: VertexId,
    EV: ExchangeData,
{
    /// Reduces the values `init` produces for each edge across all workers, in windows of
    /// `window_ms`.
    ///
    /// `init` may produce any number of values per edge. Uses the shifted tree shape; see
    /// `merge_tree_with`.
    ///
    /// # Examples
    ///
    /// ```
    /// use timely::dataflow::operators::{Inspect, ToStream};
    /// use graph_stream::{Combine, Edge, EdgeStream};
    ///
    /// ::timely::example(|scope| {
    ///     let edges = vec![Edge::new(1u32, 2u32, 5u64), Edge::new(1, 3, 7)].to_stream(scope);
    ///     EdgeStream::new(edges)
    ///         .merge_tree(|edge| Some(edge.value), Combine(|a: u64, b: u64| a + b), 100)
    ///         .unwrap()
    ///         .inspect(|total| println!("weight: {}", total));
    /// });
    /// ```
    pub fn merge_tree<T, I, J, L>(&self, init: I, fold: L, window_ms: u64) -> Result<Stream<G, T>>
    where
        T: ExchangeData,
        I: FnMut(Edge<K, EV>) -> J + 'static,
        J: IntoIterator<Item = T>,
        L: TreeFold<T>,
    {
        self.merge_tree_with(init, fold, window_ms, TreeShape::Shifted)
    }

    /// Reduces the values `init` produces across all workers using the given tree shape.
    ///
    /// Fails if `window_ms` is zero. With a single worker there are no levels and each value
    /// passes through unchanged.
    pub fn merge_tree_with<T, I, J, L>(&self, init: I, fold: L, window_ms: u64, shape: TreeShape) -> Result<Stream<G, T>>
    where
        T: ExchangeData,
        I: FnMut(Edge<K, EV>) -> J + 'static,
        J: IntoIterator<Item = T>,
        L: TreeFold<T>,
    {
        Ok(self
            .merge_tree_tagged(init, fold, window_ms, shape)?
            .map(|tagged| tagged.value))
    }

    /// As `merge_tree_with`, but keeps the final tags.
    pub fn merge_tree_tagged<T, I, J, L>(&self, init: I, fold: L, window_ms: u64, shape: TreeShape) -> Result<Stream<G, Tagged<T>>>
    where
        T: ExchangeData,
        I: FnMut(Edge<K, EV>) -> J + 'static,
        J: IntoIterator<Item = T>,
        L: TreeFold<T>,
    {
        if window_ms == 0 {
            return Err(Error::invalid("merge tree window must be positive"));
        }
        merge_partials(&self.edges.clone().flat_map(init), fold, window_ms, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_levels() {
        assert_eq!(TreeShape::Shifted.levels(1), 0);
        assert_eq!(TreeShape::Shifted.levels(2), 1);
        assert_eq!(TreeShape::Shifted.levels(4), 2);
        assert_eq!(TreeShape::Shifted.levels(6), 2);
        assert_eq!(TreeShape::Shifted.levels(8), 3);
    }

    #[test]
    fn balanced_levels() {
        assert_eq!(TreeShape::Balanced.levels(1), 0);
        assert_eq!(TreeShape::Balanced.levels(3), 2);
        assert_eq!(TreeShape::Balanced.levels(5), 3);
        assert_eq!(TreeShape::Balanced.levels(8), 3);
    }

    #[test]
    fn four_workers_reach_tag_zero() {
        assert_eq!(TreeShape::Shifted.plan(4), vec![vec![0, 1], vec![0]]);
        assert_eq!(TreeShape::Balanced.plan(4), vec![vec![0, 1], vec![0]]);
    }

    #[test]
    fn shifted_trees_over_three_workers_keep_two_tags() {
        assert_eq!(TreeShape::Shifted.plan(3), vec![vec![0, 1]]);
        assert_eq!(TreeShape::Shifted.plan(6), vec![vec![0, 1, 2], vec![0, 1]]);
        assert_eq!(TreeShape::Shifted.plan(8), vec![vec![0, 1, 2, 3], vec![0, 1], vec![0]]);
    }

    #[test]
    fn partitions_halve_at_every_level() {
        for peers in [2, 4, 8, 16, 32] {
            let plan = TreeShape::Shifted.plan(peers);
            let widths: Vec<usize> = plan.iter().map(|tags| tags.len()).collect();
            let halves: Vec<usize> = (1 ..= plan.len()).map(|level| peers >> level).collect();
            assert_eq!(widths, halves, "peers = {}", peers);
            assert_eq!(plan, TreeShape::Balanced.plan(peers));
        }
    }

    #[test]
    fn balanced_trees_reach_tag_zero() {
        for peers in 1 .. 20 {
            let plan = TreeShape::Balanced.plan(peers);
            let last = plan.last().cloned().unwrap_or_else(|| vec![0]);
            assert_eq!(last, vec![0], "peers = {}", peers);
        }
    }

    #[test]
    fn group_key_saturates() {
        assert_eq!(group_key(usize::MAX, 200), 0);
    }

    #[test]
    fn last_wins_ignores_earlier_values() {
        let mut fold = LastWins(|x: u32| x * 10);
        let mut acc = None;
        for value in [1, 2, 3] {
            acc = Some(fold.fold(acc, value));
        }
        assert_eq!(acc, Some(30));
    }

    #[test]
    fn combine_accumulates() {
        let mut fold = Combine(|a: u32, b: u32| a + b);
        let mut acc = None;
        for value in [1, 2, 3] {
            acc = Some(fold.fold(acc, value));
        }
        assert_eq!(acc, Some(6));
    }

    #[test]
    fn parse_names() {
        assert_eq!("last".parse::<FoldPolicy>(), Ok(FoldPolicy::LastWins));
        assert_eq!("Combine".parse::<FoldPolicy>(), Ok(FoldPolicy::Combine));
        assert_eq!("balanced".parse::<TreeShape>(), Ok(TreeShape::Balanced));
        assert!("sideways".parse::<TreeShape>().is_err());
    }
}
