//! Stream and formatting settings.
//!
//! Plain serde structs so callers can embed them in their own configuration.
//! Nothing here reads files or the environment.

use serde::{Deserialize, Serialize};

use crate::template::FormatType;

/// Default queue capacity of a pipe.
pub const DEFAULT_STREAM_CAPACITY: usize = 64;

/// Settings for pipes created by the stream primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Bounded queue capacity between writer and reader. Zero is treated as one.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_STREAM_CAPACITY
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}

impl StreamSettings {
    /// Create default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queue capacity.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Capacity actually used for the queue.
    #[must_use]
    pub fn effective_capacity(&self) -> usize {
        self.capacity.max(1)
    }
}

/// Settings for the content formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSettings {
    /// Substitution dialect.
    #[serde(default)]
    pub dialect: FormatType,
}

impl FormatSettings {
    /// Create default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dialect.
    #[must_use]
    pub fn dialect(mut self, dialect: FormatType) -> Self {
        self.dialect = dialect;
        self
    }
}
