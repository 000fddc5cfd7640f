//! Options recognized by the graph stream operators.
//!
//! Programs typically build one `GraphStreamConfig`, either in code or from `key=value` command
//! line arguments, and pass its fields to the operators. Arguments without an `=` are left for
//! timely's own worker configuration (`-w`, `-n`, `-p`, ...).

use serde::{Deserialize, Serialize};

use crate::edge::EdgeDirection;
use crate::error::{Error, Result};
use crate::operators::merge_tree::{FoldPolicy, TreeShape};
use crate::operators::split::DegreeSplitter;

/// Options for slicing, degree aggregation, global aggregates, and the merge tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStreamConfig {
    /// Size of slice windows, in milliseconds.
    pub window_ms: u64,
    /// Neighbor grouping used when slicing.
    pub direction: EdgeDirection,
    /// Count edges pointing at a vertex towards its degree.
    pub collect_in: bool,
    /// Count edges leaving a vertex towards its degree.
    pub collect_out: bool,
    /// Only report global aggregates that differ from the last report.
    pub suppress_unchanged: bool,
    /// Buffering interval of each merge tree level, in milliseconds.
    pub merge_window_ms: u64,
    /// How buffered merge tree values are folded.
    pub fold_policy: FoldPolicy,
    /// How merge tree tags are grouped between levels.
    pub tree_shape: TreeShape,
}

impl Default for GraphStreamConfig {
    fn default() -> Self {
        GraphStreamConfig {
            window_ms: 1000,
            direction: EdgeDirection::Out,
            collect_in: true,
            collect_out: true,
            suppress_unchanged: true,
            merge_window_ms: 1000,
            fold_policy: FoldPolicy::Combine,
            tree_shape: TreeShape::Shifted,
        }
    }
}

impl GraphStreamConfig {
    /// Reads `key=value` arguments over the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use graph_stream::{EdgeDirection, GraphStreamConfig};
    ///
    /// let args = vec!["-w", "4", "window_ms=250", "direction=in"];
    /// let config = GraphStreamConfig::from_args(args).unwrap();
    /// assert_eq!(config.window_ms, 250);
    /// assert_eq!(config.direction, EdgeDirection::In);
    /// ```
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut config = GraphStreamConfig::default();
        for arg in args {
            if let Some((key, value)) = arg.as_ref().split_once('=') {
                config.set(key.trim(), value.trim())?;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets the option named `key` from its textual `value`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "window_ms" => self.window_ms = parse(key, value)?,
            "direction" => self.direction = value.parse()?,
            "collect_in" => self.collect_in = parse(key, value)?,
            "collect_out" => self.collect_out = parse(key, value)?,
            "suppress_unchanged" => self.suppress_unchanged = parse(key, value)?,
            "merge_window_ms" => self.merge_window_ms = parse(key, value)?,
            "fold_policy" => self.fold_policy = value.parse()?,
            "tree_shape" => self.tree_shape = value.parse()?,
            _ => return Err(Error::invalid(format!("unrecognized option: {:?}", key))),
        }
        Ok(())
    }

    /// Rejects option combinations no operator can run with.
    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(Error::invalid("window_ms must be positive"));
        }
        if self.merge_window_ms == 0 {
            return Err(Error::invalid("merge_window_ms must be positive"));
        }
        Ok(())
    }

    /// The vertex splitter described by the collect flags.
    pub fn splitter(&self) -> DegreeSplitter {
        DegreeSplitter::new(self.collect_in, self.collect_out)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::invalid(format!("cannot parse {:?} for {}", value, key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_options_are_rejected() {
        let result = GraphStreamConfig::from_args(["windows=3"]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(GraphStreamConfig::from_args(["window_ms=soon"]).is_err());
        assert!(GraphStreamConfig::from_args(["window_ms=0"]).is_err());
        assert!(GraphStreamConfig::from_args(["direction=up"]).is_err());
    }

    #[test]
    fn all_options_parse() {
        let config = GraphStreamConfig::from_args([
            "collect_in=false",
            "suppress_unchanged=false",
            "merge_window_ms=20",
            "fold_policy=last",
            "tree_shape=balanced",
        ])
        .unwrap();
        assert!(!config.collect_in);
        assert!(config.collect_out);
        assert!(!config.suppress_unchanged);
        assert_eq!(config.merge_window_ms, 20);
        assert_eq!(config.fold_policy, FoldPolicy::LastWins);
        assert_eq!(config.tree_shape, TreeShape::Balanced);
        assert_eq!(config.splitter(), DegreeSplitter::new(false, true));
    }
}
