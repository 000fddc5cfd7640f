//! Tumbling windows over logical millisecond times.
//!
//! The `tumbling` operator is the one place windows are buffered. It routes each record to a
//! worker, groups records by window and key on that worker, and once the input frontier has
//! passed a window's last millisecond hands every group of the window to a firing closure.
//! Windows fire in increasing order, each exactly once, with output at the window's last
//! millisecond.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use timely::dataflow::channels::pact::Exchange;
use timely::dataflow::operators::{Capability, Operator};
use timely::dataflow::{Scope, StreamVec as Stream};

use crate::ExchangeData;

/// A half-open interval of logical time, `[start, end)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Window {
    /// First millisecond in the window.
    pub start: u64,
    /// First millisecond after the window.
    pub end: u64,
}

impl Window {
    /// The tumbling window of length `size` containing `time`.
    ///
    /// `size` must be positive. The last window is cut short at `u64::MAX`, so `time` must be
    /// below `u64::MAX` for the window to contain it.
    pub fn assign(time: u64, size: u64) -> Self {
        let start = time - time % size;
        Window { start, end: start.saturating_add(size) }
    }

    /// The last millisecond in the window, at which its results are reported.
    pub fn max_timestamp(&self) -> u64 {
        self.end - 1
    }

    /// Length of the window.
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    /// True if `time` falls in the window.
    pub fn contains(&self, time: u64) -> bool {
        self.start <= time && time < self.end
    }
}

/// Buffers `stream` into tumbling windows of `size` milliseconds.
///
/// Each record is sent to the worker chosen by `route(&key(record))` and buffered under its key.
/// When a window closes, `fire` is called once per key with the window's records in arrival
/// order, and whatever it returns is emitted at `window.max_timestamp()`.
pub(crate) fn tumbling<G, D, K, R, I, KF, RF, F>(
    stream: &Stream<G, D>,
    name: &str,
    size: u64,
    key: KF,
    route: RF,
    mut fire: F,
) -> Stream<G, R>
where
    G: Scope<Timestamp = u64>,
    D: ExchangeData,
    K: Hash + Eq + 'static,
    R: Clone + 'static,
    I: IntoIterator<Item = R>,
    KF: Fn(&D) -> K + 'static,
    RF: Fn(&K) -> u64 + 'static,
    F: FnMut(K, Window, Vec<D>) -> I + 'static,
{
    assert!(size > 0, "window size must be positive");

    let key = Rc::new(key);
    let key_exchange = Rc::clone(&key);
    let exchange = Exchange::new(move |record: &D| route(&key_exchange(record)));

    let logged = name.to_owned();
    stream.clone().unary_frontier(exchange, name, move |_capability, _info| {

        // Windows awaiting completion, each with a capability for its last millisecond.
        let mut pending: BTreeMap<Window, (Capability<u64>, HashMap<K, Vec<D>>)> = BTreeMap::new();

        move |(input, frontier), output| {

            input.for_each(|time, data| {
                let window = Window::assign(*time.time(), size);
                let (_, groups) = pending
                    .entry(window)
                    .or_insert_with(|| (time.delayed(&window.max_timestamp(), 0), HashMap::new()));
                for record in data.drain(..) {
                    groups.entry(key(&record)).or_insert_with(Vec::new).push(record);
                }
            });

            // Fire, in order, every window whose times are all complete.
            while let Some(entry) = pending.first_entry() {
                if frontier.frontier().less_equal(&entry.key().max_timestamp()) {
                    break;
                }
                let (window, (capability, groups)) = entry.remove_entry();
                tracing::debug!(operator = %logged, start = window.start, end = window.end, keys = groups.len(), "window fired");
                let mut session = output.session(&capability);
                for (group, records) in groups {
                    session.give_iterator(fire(group, window, records).into_iter());
                }
            }
        }
    })
}
