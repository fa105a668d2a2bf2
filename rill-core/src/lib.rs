//! # rill-core
//!
//! Core types, chunk concatenation and message formatting for rill.
//!
//! This crate provides the foundational pieces used by the rest of the workspace:
//!
//! - **Concat**: the [`Concat`] trait, field policies and the type-keyed registry
//! - **Messages**: [`Message`], [`ToolCall`] and [`ToolResult`] with their reducers
//! - **Template**: variable substitution in three placeholder dialects
//! - **Errors**: [`ConcatError`], [`ConflictError`] and [`TemplateError`]
//! - **Settings**: stream and formatter configuration
//!
//! ## Feature Flags
//!
//! - `derive`: `#[derive(Concat)]` for user structs (enabled by default)
//! - `tracing-integration`: Enable tracing instrumentation
//! - `full`: Enable all optional features
//!
//! ## Example
//!
//! ```rust
//! use rill_core::{concat_slice, Message};
//!
//! let chunks = vec![
//!     Message::assistant("Hel", vec![]),
//!     Message::assistant("lo", vec![]),
//! ];
//! let message = concat_slice(&chunks).unwrap();
//! assert_eq!(message.content, "Hello");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Lets `#[derive(Concat)]` resolve `::rill_core` paths inside this crate.
extern crate self as rill_core;

pub mod concat;
pub mod errors;
pub mod messages;
pub mod settings;
pub mod template;
pub mod usage;

pub use concat::{
    concat, concat_slice, global_registry, registry::concat_registered, Concat, ConcatRegistry,
};
pub use errors::{ConcatError, ConcatResult, ConflictError, ConflictKind, TemplateError};
pub use messages::{
    concat_messages, concat_tool_calls, concat_tool_results, ChatMessagePart, Message,
    MessageInputPart, MessageOutputPart, MessagePartCommon, ResponseMeta, Role, ToolCall,
    ToolOutputPart, ToolPartType, ToolResult,
};
pub use settings::{FormatSettings, StreamSettings, DEFAULT_STREAM_CAPACITY};
pub use template::{ChatTemplate, FormatType, MessagesPlaceholder, MessagesTemplate, Variables};
pub use usage::TokenUsage;

#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use rill_macros::Concat;

/// Prelude module for common imports.
///
/// ```rust
/// use rill_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::concat::{concat, concat_slice, Concat, IsEmpty};
    pub use crate::errors::{ConcatError, ConcatResult, ConflictError, TemplateError};
    pub use crate::messages::{
        concat_messages, concat_tool_calls, concat_tool_results, ChatMessagePart, FunctionCall,
        Message, MessageInputPart, MessageOutputPart, MessagePartCommon, PartType, ResponseMeta,
        Role, ToolCall, ToolOutputPart, ToolPartType, ToolResult,
    };
    pub use crate::settings::{FormatSettings, StreamSettings};
    pub use crate::template::{ChatTemplate, FormatType, MessagesTemplate, TemplateValue, Variables};
    pub use crate::usage::TokenUsage;
}
