//! Tool-specific error types.

use rill_streaming::StreamError;
use thiserror::Error;

/// Errors raised while running a streamable tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The JSON arguments could not be decoded into the tool's input type.
    #[error("failed to unmarshal arguments, tool_name={tool_name}, err={source}")]
    Unmarshal {
        /// Name of the tool.
        tool_name: String,
        /// Decoder error.
        #[source]
        source: anyhow::Error,
    },

    /// A streamed output could not be encoded as a string.
    #[error("failed to marshal output, tool_name={tool_name}, err={source}")]
    Marshal {
        /// Name of the tool.
        tool_name: String,
        /// Encoder error.
        #[source]
        source: anyhow::Error,
    },

    /// The tool function failed before producing a stream.
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    /// Stream error.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolError {
    /// Create an execution failure.
    #[must_use]
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Name of the tool the error is about, when known.
    #[must_use]
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::Unmarshal { tool_name, .. } | Self::Marshal { tool_name, .. } => Some(tool_name),
            _ => None,
        }
    }
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::execution_failed(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::execution_failed(s)
    }
}
