//! # rill - Incremental Output Reconciliation for LLM Applications
//!
//! Language models answer a little at a time. rill carries those partial
//! outputs from producer to consumer and folds them back into complete values.
//!
//! ## Quick Start
//!
//! ```rust
//! use rill::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (reader, mut writer) = pipe(16);
//! tokio::spawn(async move {
//!     for piece in ["The answer", " is ", "42."] {
//!         if writer.send(Message::assistant(piece, vec![])).await {
//!             break;
//!         }
//!     }
//! });
//!
//! let message = reader.concat().await.unwrap();
//! assert_eq!(message.content, "The answer is 42.");
//! # }
//! ```
//!
//! ## Key Features
//!
//! - **Bounded streams** with lazy conversion, fan-in and fan-out
//! - **Chunk concatenation** for messages, tool calls and tool results
//! - **Conflict detection** when chunks disagree on identity fields
//! - **Message templates** in f-string, Jinja2 and Go-template dialects
//! - **Tools** built from async closures, with per-call options
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `macros` | `#[derive(Concat)]` | ✅ |
//! | `tools` | Invokable and streamable tools | ❌ |
//! | `tracing-integration` | Tracing in the reducers | ❌ |
//! | `full` | All features | ❌ |
//!
//! ## Architecture
//!
//! rill is organized as a workspace of focused crates:
//!
//! - [`rill_core`] - Messages, concatenation, templates and errors
//! - [`rill_streaming`] - Pipes, readers and stream combinators
//! - `rill_tools` - Invokable and streamable tools (optional)
//! - `rill_macros` - Procedural macros (optional)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Lets `#[derive(Concat)]` resolve `::rill::core` paths inside this crate.
extern crate self as rill;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Core types, concatenation, templates and errors.
pub use rill_core as core;

/// Stream primitive.
pub use rill_streaming as streaming;

/// Invokable and streamable tools.
#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use rill_tools as tools;

// ============================================================================
// Macro Re-exports
// ============================================================================

/// Derive macro for field-by-field concatenation, expanding through `rill::core`.
///
/// ```rust
/// use rill::{concat_slice, Concat};
///
/// #[derive(Debug, Clone, Concat)]
/// struct Progress {
///     #[concat(append)]
///     log: String,
///     status: String,
/// }
///
/// let done = concat_slice(&[
///     Progress { log: "fetch ".into(), status: "running".into() },
///     Progress { log: "parse".into(), status: "done".into() },
/// ])
/// .unwrap();
/// assert_eq!(done.log, "fetch parse");
/// assert_eq!(done.status, "done");
/// ```
#[cfg(feature = "macros")]
#[cfg_attr(docsrs, doc(cfg(feature = "macros")))]
pub use rill_macros::RillConcat as Concat;

// ============================================================================
// Core Type Re-exports (Flat)
// ============================================================================

// Errors
pub use rill_core::{ConcatError, ConflictError, ConflictKind, TemplateError};

// Concatenation
pub use rill_core::concat::Concat;
pub use rill_core::{concat, concat_slice, global_registry, ConcatRegistry};

// Messages
pub use rill_core::{
    concat_messages, concat_tool_calls, concat_tool_results, ChatMessagePart, Message,
    MessageInputPart, MessageOutputPart, MessagePartCommon, ResponseMeta, Role, ToolCall,
    ToolOutputPart, ToolPartType, ToolResult,
};

// Templates
pub use rill_core::{ChatTemplate, FormatType, MessagesPlaceholder, MessagesTemplate, Variables};

// Settings and usage
pub use rill_core::{FormatSettings, StreamSettings, TokenUsage};

// Streaming
pub use rill_streaming::{
    merge, pipe, pipe_with_config, StreamConfig, StreamError, StreamReader, StreamResult,
    StreamWriter,
};

// Tools
#[cfg(feature = "tools")]
pub use rill_tools::{
    BaseTool, EnhancedFunctionTool, EnhancedInvokableTool, EnhancedStreamFunctionTool,
    EnhancedStreamableTool, FunctionTool, InvokableTool, StreamFunctionTool, StreamableTool,
    ToolArgument, ToolError, ToolInfo, ToolOptions,
};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use rill::prelude::*;
/// ```
pub mod prelude {
    pub use rill_core::prelude::*;
    pub use rill_streaming::prelude::*;

    #[cfg(feature = "tools")]
    pub use rill_tools::prelude::*;

    #[cfg(feature = "macros")]
    pub use crate::Concat;
}

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of rill.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns version information as a tuple (major, minor, patch).
pub fn version_tuple() -> (u32, u32, u32) {
    let version = version();
    let parts: Vec<&str> = version.split('.').collect();
    (
        parts.first().and_then(|s| s.parse().ok()).unwrap_or(0),
        parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(0),
        parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(0),
    )
}
