//! # rill-tools
//!
//! Tools for rill.
//!
//! A tool receives its arguments as a JSON document and answers either with a
//! single value or with a [`StreamReader`](rill_streaming::StreamReader).
//!
//! ## Core Concepts
//!
//! - **[`BaseTool`]**: the tool's [`ToolInfo`] and derived type name
//! - **[`InvokableTool`]** / **[`EnhancedInvokableTool`]**: answer with a string or a [`ToolResult`](rill_core::ToolResult)
//! - **[`StreamableTool`]** / **[`EnhancedStreamableTool`]**: stream strings or [`ToolResult`](rill_core::ToolResult) chunks
//! - **[`FunctionTool`]**, **[`EnhancedFunctionTool`]**, **[`StreamFunctionTool`]**, **[`EnhancedStreamFunctionTool`]**: build any of them from an async closure
//! - **[`ToolOptions`]**: per-call options each tool reads into its own options type
//! - **[`ToolInfo::infer`]**: derive the parameter schema from the argument type
//!
//! ## Example
//!
//! ```rust
//! use rill_core::ToolResult;
//! use rill_streaming::StreamReader;
//! use rill_tools::{BaseTool, EnhancedStreamFunctionTool, EnhancedStreamableTool, ToolInfo, ToolOptions};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Search { query: String }
//!
//! #[derive(Default)]
//! struct SearchOptions { top_k: usize }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tool = EnhancedStreamFunctionTool::optionable(
//!     ToolInfo::infer::<Search>("web_search", "Search the web").unwrap(),
//!     |args: Search, options: ToolOptions| async move {
//!         let top_k = options.apply(SearchOptions { top_k: 1 }).top_k;
//!         Ok(StreamReader::from_vec(vec![
//!             ToolResult::text(format!("top {top_k} for {}: ", args.query)),
//!             ToolResult::text("rust-lang.org"),
//!         ]))
//!     },
//! );
//! assert_eq!(tool.tool_type(), "WebSearch");
//! assert_eq!(tool.info().parameters["required"][0], "query");
//!
//! let options = ToolOptions::new().with(|o: &mut SearchOptions| o.top_k = 3);
//! let result = tool
//!     .stream_run(r#"{"query":"rust"}"#.into(), &options)
//!     .await
//!     .unwrap()
//!     .concat()
//!     .await
//!     .unwrap();
//! assert_eq!(result.text_content(), "top 3 for rust: rust-lang.org");
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod definition;
pub mod errors;
pub mod options;
pub mod tool;

pub use definition::{snake_to_camel, ToolArgument, ToolInfo};
pub use errors::ToolError;
pub use options::ToolOptions;
pub use tool::{
    BaseTool, BoxedEnhancedInvokableTool, BoxedEnhancedStreamableTool, BoxedInvokableTool,
    BoxedStreamableTool, EnhancedFunctionTool, EnhancedInvokableTool, EnhancedStreamFunctionTool,
    EnhancedStreamableTool, FunctionTool, InvokableTool, MarshalFn, StreamFunctionTool,
    StreamableTool, UnmarshalFn,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        BaseTool, EnhancedFunctionTool, EnhancedInvokableTool, EnhancedStreamFunctionTool,
        EnhancedStreamableTool, FunctionTool, InvokableTool, StreamFunctionTool, StreamableTool,
        ToolArgument, ToolError, ToolInfo, ToolOptions,
    };
}
