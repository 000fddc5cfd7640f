//! Errors raised while constructing graph stream dataflows.

/// Failures detected before any operator is built.
///
/// Per-record failures inside user closures are not represented here: they panic the owning
/// worker, and `timely::execute` reports the worker as failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An option or argument that cannot be used, e.g. an unknown edge direction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

/// Result alias for fallible dataflow construction.
pub type Result<T> = std::result::Result<T, Error>;
