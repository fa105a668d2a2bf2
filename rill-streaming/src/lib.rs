//! # rill-streaming
//!
//! Bounded asynchronous streams for rill.
//!
//! A stream is a pipe between one producer and one consumer. Readers can be
//! transformed lazily, merged, copied and finally drained or reduced.
//!
//! ## Core Concepts
//!
//! - **[`pipe`]**: create a bounded [`StreamWriter`] / [`StreamReader`] pair
//! - **[`StreamReader::convert`]**: map chunks lazily, skipping [`StreamError::NoValue`]
//! - **[`merge`]**: fan-in in completion order
//! - **[`StreamReader::copy`]**: fan-out with per-copy buffers
//! - **[`StreamReader::concat`]**: drain and reduce to one value
//!
//! ## Example
//!
//! ```rust
//! use rill_core::Message;
//! use rill_streaming::pipe;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (reader, mut writer) = pipe(8);
//! tokio::spawn(async move {
//!     for piece in ["Hel", "lo"] {
//!         if writer.send(Message::assistant(piece, vec![])).await {
//!             break;
//!         }
//!     }
//! });
//!
//! let message = reader.concat().await.unwrap();
//! assert_eq!(message.content, "Hello");
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod copy;
pub mod error;
pub mod merge;
pub mod pipe;
pub mod reader;

pub use error::{StreamError, StreamResult};
pub use merge::merge;
pub use pipe::{pipe, pipe_with_config, StreamWriter};
pub use reader::StreamReader;

/// Settings accepted by [`pipe_with_config`].
pub type StreamConfig = rill_core::settings::StreamSettings;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        merge, pipe, pipe_with_config, StreamConfig, StreamError, StreamReader, StreamResult,
        StreamWriter,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rill_core::{Message, ToolCall};

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let config = StreamConfig::default();
        assert_eq!(config.effective_capacity(), 64);
    }

    #[tokio::test]
    async fn test_tool_call_fragments_through_copy_and_concat() {
        let (reader, mut writer) = pipe(2);
        tokio::spawn(async move {
            let chunks = vec![
                Message::assistant("", vec![ToolCall::function("call_1", "search", "").with_index(0)]),
                Message::assistant("", vec![ToolCall::fragment(0, r#"{"q":"#)]),
                Message::assistant("", vec![ToolCall::fragment(0, r#""rust"}"#)]),
            ];
            for chunk in chunks {
                if writer.send(chunk).await {
                    break;
                }
            }
        });

        let mut copies = reader.copy(2);
        let logged = copies.pop().unwrap();
        let reduced = copies.pop().unwrap();

        let (message, chunks) = tokio::join!(reduced.concat(), logged.drain());
        let message = message.unwrap();
        assert_eq!(chunks.unwrap().len(), 3);
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].function.arguments, r#"{"q":"rust"}"#);
    }
}
