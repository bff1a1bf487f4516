//! Error types shared by buffers, observers and projections.

/// Boxed error produced by user-supplied callbacks (mappers, filters, observers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while propagating changes through a view graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The mapper failed for an item under reconciliation.
    #[error("mapper failed: {0}")]
    Map(#[source] BoxError),

    /// The filter predicate failed for an item under reconciliation.
    #[error("filter predicate failed: {0}")]
    Filter(#[source] BoxError),

    /// A downstream observer callback failed.
    #[error("observer failed: {0}")]
    Observer(#[source] BoxError),

    /// Reconciliation re-entered itself more often than allowed.
    #[error("reentrancy limit exceeded: depth {depth} (max {max})")]
    ReentrancyLimit {
        /// Depth that was about to be entered.
        depth: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A positional buffer operation addressed a slot that does not exist.
    #[error("index {idx} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index.
        idx: usize,
        /// Length of the buffer at the time of the call.
        len: usize,
    },
}

impl Error {
    pub fn map(err: impl Into<BoxError>) -> Self {
        Error::Map(err.into())
    }

    pub fn filter(err: impl Into<BoxError>) -> Self {
        Error::Filter(err.into())
    }

    pub fn observer(err: impl Into<BoxError>) -> Self {
        Error::Observer(err.into())
    }
}
