//! Operators over edge streams.
//!
//! Most operators are exposed as methods on `EdgeStream`, and are implemented in the module for
//! the mechanism they rely on. The `window` module holds the tumbling-window operator the windowed
//! operators share.

pub mod aggregate;
pub mod global;
pub mod merge_tree;
pub mod slice;
pub mod split;
pub mod summary;
pub mod window;
