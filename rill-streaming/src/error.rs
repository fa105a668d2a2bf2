//! Streaming errors.

use rill_core::errors::ConcatError;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Errors delivered through a stream.
///
/// Cloneable so one failure can reach every copy of a fanned-out stream.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// Error reported by the producer.
    #[error("{0}")]
    Producer(Arc<dyn StdError + Send + Sync>),

    /// The other side of the pipe is gone.
    #[error("stream closed")]
    Closed,

    /// Sentinel returned by converters to skip a chunk or an error.
    #[error("no value")]
    NoValue,

    /// Reducing the drained chunks failed.
    #[error(transparent)]
    Concat(#[from] ConcatError),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl StreamError {
    /// Wrap a producer error.
    pub fn producer<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(err))
    }

    /// Create from any displayable error.
    pub fn from_err<E: std::fmt::Display>(err: E) -> Self {
        Self::Other(err.to_string())
    }

    /// Check if this is the skip sentinel.
    #[must_use]
    pub fn is_no_value(&self) -> bool {
        matches!(self, Self::NoValue)
    }

    /// The wrapped producer error, if any.
    #[must_use]
    pub fn as_producer(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Producer(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
