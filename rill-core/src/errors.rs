//! Error types for rill.
//!
//! Every failure in the core is returned to the immediate caller. Nothing here
//! is retried or swallowed: a conflict or missing chunk aborts the reduction of
//! that one logical value and leaves unrelated reductions untouched.

use std::fmt;
use thiserror::Error;

/// Result type alias for reductions.
pub type ConcatResult<T> = std::result::Result<T, ConcatError>;

/// Errors raised while folding an ordered chunk sequence into one value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConcatError {
    /// A chunk in the input sequence is absent.
    #[error("unexpected nil chunk in {kind} stream, index: {index}")]
    NilChunk {
        /// Name of the chunk type being reduced.
        kind: &'static str,
        /// Position of the missing chunk.
        index: usize,
    },

    /// The input contained no chunks.
    #[error("cannot concat empty {kind} chunk sequence")]
    EmptyInput {
        /// Name of the chunk type being reduced.
        kind: &'static str,
    },

    /// Two chunks disagree on a value that must be singular.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// No reducer is registered for the requested type.
    #[error("no reducer registered for type {0}")]
    Unregistered(&'static str),

    /// A type-erased chunk did not have the expected concrete type.
    #[error("chunk at index {index} is not a {expected}")]
    TypeMismatch {
        /// Name of the expected type.
        expected: &'static str,
        /// Position of the offending chunk.
        index: usize,
    },
}

impl ConcatError {
    /// Create a nil-chunk error for the given chunk type.
    #[must_use]
    pub fn nil_chunk(kind: &'static str, index: usize) -> Self {
        Self::NilChunk { kind, index }
    }

    /// Create an empty-input error for the given chunk type.
    #[must_use]
    pub fn empty_input(kind: &'static str) -> Self {
        Self::EmptyInput { kind }
    }

    /// Check whether this is a conflict between chunks.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Get the conflict details, if this is a conflict.
    #[must_use]
    pub fn as_conflict(&self) -> Option<&ConflictError> {
        match self {
            Self::Conflict(c) => Some(c),
            _ => None,
        }
    }
}

/// Which singular value two chunks disagreed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// Message role.
    Role,
    /// Message name.
    Name,
    /// Message tool call ID (role = tool).
    ToolCallId,
    /// Message tool name (role = tool).
    ToolName,
    /// ID of an index-correlated tool call.
    ToolCallFragmentId,
    /// Type of an index-correlated tool call.
    ToolCallFragmentType,
    /// Function name of an index-correlated tool call.
    ToolCallFragmentName,
    /// A field of a rich-media part.
    Media {
        /// Media type, e.g. `"audio"`.
        media: &'static str,
        /// Field name, e.g. `"url"`.
        field: &'static str,
    },
}

/// Two chunks of one logical value carry different non-empty values for an
/// atomic field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ConflictError {
    /// The field in conflict.
    pub kind: ConflictKind,
    /// Value established by an earlier chunk.
    pub first: String,
    /// Conflicting value from a later chunk.
    pub second: String,
}

impl ConflictError {
    /// Create a new conflict error.
    pub fn new(kind: ConflictKind, first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            kind,
            first: first.into(),
            second: second.into(),
        }
    }

    /// Media type involved in the conflict, if any.
    #[must_use]
    pub fn media(&self) -> Option<&'static str> {
        match self.kind {
            ConflictKind::Media { media, .. } => Some(media),
            _ => None,
        }
    }
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, second) = (&self.first, &self.second);
        match self.kind {
            ConflictKind::Role => write!(
                f,
                "cannot concat messages with different roles: '{first}' '{second}'"
            ),
            ConflictKind::Name => write!(
                f,
                "cannot concat messages with different names: '{first}' '{second}'"
            ),
            ConflictKind::ToolCallId => write!(
                f,
                "cannot concat messages with different toolCallIDs: '{first}' '{second}'"
            ),
            ConflictKind::ToolName => write!(
                f,
                "cannot concat messages with different tool names: '{first}' '{second}'"
            ),
            ConflictKind::ToolCallFragmentId => write!(
                f,
                "cannot concat ToolCalls with different tool id: '{first}' '{second}'"
            ),
            ConflictKind::ToolCallFragmentType => write!(
                f,
                "cannot concat ToolCalls with different tool type: '{first}' '{second}'"
            ),
            ConflictKind::ToolCallFragmentName => write!(
                f,
                "cannot concat ToolCalls with different tool name: '{first}' '{second}'"
            ),
            ConflictKind::Media { media, field } => write!(
                f,
                "conflicting {field} values for {media} part: '{first}' '{second}'"
            ),
        }
    }
}

/// Errors raised while rendering templates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A referenced variable is not defined and the dialect is strict.
    #[error("template variable '{name}' is not defined")]
    MissingVariable {
        /// Variable name.
        name: String,
    },

    /// The message history placeholder has no value.
    #[error("message history placeholder '{key}' has no value")]
    MissingMessages {
        /// Placeholder key.
        key: String,
    },

    /// A variable holds a value of the wrong shape.
    #[error("template variable '{name}' is invalid: {reason}")]
    InvalidVariable {
        /// Variable name.
        name: String,
        /// Why the value cannot be used.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_chunk_message() {
        let err = ConcatError::nil_chunk("message", 0);
        assert_eq!(err.to_string(), "unexpected nil chunk in message stream, index: 0");
    }

    #[test]
    fn test_conflict_messages() {
        let err = ConflictError::new(ConflictKind::Role, "user", "assistant");
        assert!(err
            .to_string()
            .contains("cannot concat messages with different roles"));

        let err = ConflictError::new(ConflictKind::ToolCallFragmentType, "function", "x");
        assert!(err
            .to_string()
            .contains("cannot concat ToolCalls with different tool type"));

        let err = ConflictError::new(
            ConflictKind::Media {
                media: "audio",
                field: "base64_data",
            },
            "a",
            "b",
        );
        let msg = err.to_string();
        assert!(msg.contains("conflicting"));
        assert!(msg.contains("audio"));
        assert_eq!(err.media(), Some("audio"));
    }

    #[test]
    fn test_conflict_converts_into_concat_error() {
        let err: ConcatError = ConflictError::new(ConflictKind::Name, "a", "b").into();
        assert!(err.is_conflict());
        assert_eq!(err.as_conflict().map(|c| c.kind), Some(ConflictKind::Name));
    }
}
