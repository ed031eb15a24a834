//! Adapter error definitions.

use thiserror::Error;

/// Errors raised while building buffer chains in a request pool.
///
/// Reads never fail: an exhausted source is a normal end-of-stream signal.
/// A malformed `maxage` argument never fails either; it is absorbed during
/// finalization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The pool's byte budget cannot hold another segment payload.
    #[error("request pool exhausted: {requested} more bytes requested, {available} of {limit} available")]
    ResourceExhausted {
        requested: usize,
        available: usize,
        limit: usize,
    },

    /// The pool cannot allocate another link node.
    #[error("request pool exhausted: segment limit of {limit} reached")]
    SegmentLimit { limit: usize },
}

impl From<StreamError> for std::io::Error {
    fn from(err: StreamError) -> Self {
        std::io::Error::new(std::io::ErrorKind::OutOfMemory, err)
    }
}

/// Result type for chain operations.
pub type StreamResult<T> = Result<T, StreamError>;
