//! Message types and their reducers.
//!
//! - **Messages**: [`Message`], [`Role`], [`ResponseMeta`] and log-probabilities
//! - **Parts**: user input, model output and legacy multi-modal parts
//! - **Tools**: [`ToolCall`] fragments and structured [`ToolResult`]s
//! - **Reducers**: [`concat_messages`], [`concat_tool_calls`], [`concat_tool_results`]
//!
//! ## Example
//!
//! ```rust
//! use rill_core::messages::{concat_messages, Message, ToolCall};
//!
//! let chunks = vec![
//!     Message::assistant("", vec![ToolCall::function("call_1", "search", "").with_index(0)]),
//!     Message::assistant("", vec![ToolCall::fragment(0, r#"{"q":"rust"}"#)]),
//! ];
//! let message = concat_messages(&chunks).unwrap();
//! assert_eq!(message.tool_calls.len(), 1);
//! assert_eq!(message.tool_calls[0].function.arguments, r#"{"q":"rust"}"#);
//! ```

pub mod concat;
mod display;
pub mod message;
pub mod parts;
pub mod tool_call;
pub mod tool_result;

pub use concat::{concat_messages, concat_tool_calls, concat_tool_results};
pub use message::{LogProb, LogProbs, Message, ResponseMeta, Role, TopLogProb};
pub use parts::{
    ChatMessageImageUrl, ChatMessageMediaUrl, ChatMessagePart, ImageDetail, MessageInputImage,
    MessageInputPart, MessageOutputPart, MessagePartCommon, PartType,
};
pub use tool_call::{FunctionCall, ToolCall};
pub use tool_result::{ToolOutputPart, ToolPartType, ToolResult};
