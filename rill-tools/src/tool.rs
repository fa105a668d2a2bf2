//! Tool traits and function-backed implementations.
//!
//! Every tool describes itself through [`BaseTool`] and runs in one of four
//! shapes:
//!
//! | Trait | Arguments | Output |
//! |-------|-----------|--------|
//! | [`InvokableTool`] | JSON string | `String` |
//! | [`EnhancedInvokableTool`] | [`ToolArgument`] | [`ToolResult`] |
//! | [`StreamableTool`] | JSON string | `StreamReader<String>` |
//! | [`EnhancedStreamableTool`] | [`ToolArgument`] | `StreamReader<ToolResult>` |
//!
//! Each run also receives the caller's [`ToolOptions`]. The function adapters
//! ([`FunctionTool`], [`EnhancedFunctionTool`], [`StreamFunctionTool`] and
//! [`EnhancedStreamFunctionTool`]) build a tool from an async closure; their
//! `optionable` constructors hand the options to the closure.

use async_trait::async_trait;
use rill_core::messages::ToolResult;
use rill_streaming::{StreamError, StreamReader};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::definition::{ToolArgument, ToolInfo};
use crate::errors::ToolError;
use crate::options::ToolOptions;

/// What every tool exposes to the model.
pub trait BaseTool: Send + Sync {
    /// Describe the tool.
    fn info(&self) -> ToolInfo;

    /// CamelCase type name derived from the tool name.
    fn tool_type(&self) -> String {
        self.info().tool_type()
    }
}

/// A tool that answers with one string.
#[async_trait]
pub trait InvokableTool: BaseTool {
    /// Run the tool with JSON arguments.
    async fn invoke(&self, arguments: &str, options: &ToolOptions) -> Result<String, ToolError>;
}

/// A tool that answers with one structured result.
#[async_trait]
pub trait EnhancedInvokableTool: BaseTool {
    /// Run the tool.
    async fn invoke(
        &self,
        argument: ToolArgument,
        options: &ToolOptions,
    ) -> Result<ToolResult, ToolError>;
}

/// A tool whose output is streamed as strings.
#[async_trait]
pub trait StreamableTool: BaseTool {
    /// Run the tool with JSON arguments.
    async fn stream_run(
        &self,
        arguments: &str,
        options: &ToolOptions,
    ) -> Result<StreamReader<String>, ToolError>;
}

/// A tool whose output is streamed as structured results.
///
/// The chunks can be reduced with `rill_core::concat_tool_results`.
#[async_trait]
pub trait EnhancedStreamableTool: BaseTool {
    /// Run the tool.
    async fn stream_run(
        &self,
        argument: ToolArgument,
        options: &ToolOptions,
    ) -> Result<StreamReader<ToolResult>, ToolError>;
}

/// Type-erased invokable tool.
pub type BoxedInvokableTool = Arc<dyn InvokableTool>;

/// Type-erased enhanced invokable tool.
pub type BoxedEnhancedInvokableTool = Arc<dyn EnhancedInvokableTool>;

/// Type-erased streamable tool.
pub type BoxedStreamableTool = Arc<dyn StreamableTool>;

/// Type-erased enhanced streamable tool.
pub type BoxedEnhancedStreamableTool = Arc<dyn EnhancedStreamableTool>;

/// Custom argument decoder.
pub type UnmarshalFn<I> = Arc<dyn Fn(&str) -> anyhow::Result<I> + Send + Sync>;

/// Custom output encoder.
pub type MarshalFn<O> = Arc<dyn Fn(&O) -> anyhow::Result<String> + Send + Sync>;

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type ToolFn<I, T> = Arc<dyn Fn(I, ToolOptions) -> PinnedFuture<Result<T, ToolError>> + Send + Sync>;

fn plain_fn<I, T, F, Fut>(function: F) -> ToolFn<I, T>
where
    I: 'static,
    T: 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ToolError>> + Send + 'static,
{
    Arc::new(move |input: I, _: ToolOptions| -> PinnedFuture<Result<T, ToolError>> {
        Box::pin(function(input))
    })
}

fn optionable_fn<I, T, F, Fut>(function: F) -> ToolFn<I, T>
where
    I: 'static,
    T: 'static,
    F: Fn(I, ToolOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ToolError>> + Send + 'static,
{
    Arc::new(move |input: I, options: ToolOptions| -> PinnedFuture<Result<T, ToolError>> {
        Box::pin(function(input, options))
    })
}

fn decode_arguments<I>(
    tool_name: &str,
    unmarshal: Option<&UnmarshalFn<I>>,
    arguments: &str,
) -> Result<I, ToolError>
where
    I: DeserializeOwned,
{
    let decoded = match unmarshal {
        Some(unmarshal) => unmarshal(arguments),
        None => serde_json::from_str(arguments).map_err(anyhow::Error::from),
    };
    decoded.map_err(|source| {
        warn!(tool_name, error = %source, "failed to unmarshal tool arguments");
        ToolError::Unmarshal {
            tool_name: tool_name.to_string(),
            source,
        }
    })
}

/// Strings pass through untouched; everything else becomes JSON.
fn encode_output<O>(tool_name: &str, marshal: Option<&MarshalFn<O>>, output: &O) -> Result<String, ToolError>
where
    O: Serialize + 'static,
{
    let encoded = match marshal {
        Some(marshal) => marshal(output),
        None => match (output as &dyn Any).downcast_ref::<String>() {
            Some(text) => Ok(text.clone()),
            None => serde_json::to_string(output).map_err(anyhow::Error::from),
        },
    };
    encoded.map_err(|source| ToolError::Marshal {
        tool_name: tool_name.to_string(),
        source,
    })
}

// ============================================================================
// FunctionTool
// ============================================================================

/// An [`InvokableTool`] backed by an async function.
///
/// Arguments are decoded into `I` with serde (or a custom decoder) and the
/// function's `O` is encoded as JSON (or with a custom encoder). `String`
/// outputs are returned as-is.
///
/// # Example
///
/// ```rust
/// use rill_tools::{FunctionTool, InvokableTool, ToolInfo, ToolOptions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct Add { a: i64, b: i64 }
///
/// #[derive(Serialize)]
/// struct Sum { sum: i64 }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tool = FunctionTool::new(ToolInfo::new("add", "Add two numbers"), |args: Add| async move {
///     Ok(Sum { sum: args.a + args.b })
/// });
///
/// let out = tool.invoke(r#"{"a":2,"b":3}"#, &ToolOptions::new()).await.unwrap();
/// assert_eq!(out, r#"{"sum":5}"#);
/// # }
/// ```
pub struct FunctionTool<I, O> {
    info: ToolInfo,
    function: ToolFn<I, O>,
    unmarshal: Option<UnmarshalFn<I>>,
    marshal: Option<MarshalFn<O>>,
}

impl<I: 'static, O: 'static> FunctionTool<I, O> {
    /// Create a tool from a function of the decoded arguments.
    pub fn new<F, Fut>(info: ToolInfo, function: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    {
        Self::from_fn(info, plain_fn(function))
    }

    /// Create a tool whose function also receives the per-call options.
    pub fn optionable<F, Fut>(info: ToolInfo, function: F) -> Self
    where
        F: Fn(I, ToolOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    {
        Self::from_fn(info, optionable_fn(function))
    }

    fn from_fn(info: ToolInfo, function: ToolFn<I, O>) -> Self {
        Self {
            info,
            function,
            unmarshal: None,
            marshal: None,
        }
    }

    /// Decode arguments with a custom function instead of serde.
    #[must_use]
    pub fn with_unmarshal<U>(mut self, unmarshal: U) -> Self
    where
        U: Fn(&str) -> anyhow::Result<I> + Send + Sync + 'static,
    {
        self.unmarshal = Some(Arc::new(unmarshal));
        self
    }

    /// Encode the output with a custom function instead of serde.
    #[must_use]
    pub fn with_marshal<M>(mut self, marshal: M) -> Self
    where
        M: Fn(&O) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.marshal = Some(Arc::new(marshal));
        self
    }
}

impl<I, O> BaseTool for FunctionTool<I, O> {
    fn info(&self) -> ToolInfo {
        self.info.clone()
    }
}

#[async_trait]
impl<I, O> InvokableTool for FunctionTool<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    async fn invoke(&self, arguments: &str, options: &ToolOptions) -> Result<String, ToolError> {
        debug!(tool_name = %self.info.name, "invoking tool");
        let input = decode_arguments(&self.info.name, self.unmarshal.as_ref(), arguments)?;
        let output = (self.function)(input, options.clone()).await?;
        encode_output(&self.info.name, self.marshal.as_ref(), &output)
    }
}

impl<I, O> std::fmt::Debug for FunctionTool<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("info", &self.info)
            .field("custom_unmarshal", &self.unmarshal.is_some())
            .field("custom_marshal", &self.marshal.is_some())
            .finish()
    }
}

// ============================================================================
// EnhancedFunctionTool
// ============================================================================

/// An [`EnhancedInvokableTool`] backed by an async function.
///
/// Argument handling matches [`FunctionTool`]; the function's [`ToolResult`]
/// is returned unchanged.
pub struct EnhancedFunctionTool<I> {
    info: ToolInfo,
    function: ToolFn<I, ToolResult>,
    unmarshal: Option<UnmarshalFn<I>>,
}

impl<I: 'static> EnhancedFunctionTool<I> {
    /// Create a tool from a function of the decoded arguments.
    pub fn new<F, Fut>(info: ToolInfo, function: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        Self::from_fn(info, plain_fn(function))
    }

    /// Create a tool whose function also receives the per-call options.
    pub fn optionable<F, Fut>(info: ToolInfo, function: F) -> Self
    where
        F: Fn(I, ToolOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        Self::from_fn(info, optionable_fn(function))
    }

    fn from_fn(info: ToolInfo, function: ToolFn<I, ToolResult>) -> Self {
        Self {
            info,
            function,
            unmarshal: None,
        }
    }

    /// Decode arguments with a custom function instead of serde.
    #[must_use]
    pub fn with_unmarshal<U>(mut self, unmarshal: U) -> Self
    where
        U: Fn(&str) -> anyhow::Result<I> + Send + Sync + 'static,
    {
        self.unmarshal = Some(Arc::new(unmarshal));
        self
    }
}

impl<I> BaseTool for EnhancedFunctionTool<I> {
    fn info(&self) -> ToolInfo {
        self.info.clone()
    }
}

#[async_trait]
impl<I> EnhancedInvokableTool for EnhancedFunctionTool<I>
where
    I: DeserializeOwned + Send + 'static,
{
    async fn invoke(
        &self,
        argument: ToolArgument,
        options: &ToolOptions,
    ) -> Result<ToolResult, ToolError> {
        debug!(tool_name = %self.info.name, "invoking enhanced tool");
        let input = decode_arguments(&self.info.name, self.unmarshal.as_ref(), &argument.text)?;
        (self.function)(input, options.clone()).await
    }
}

impl<I> std::fmt::Debug for EnhancedFunctionTool<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancedFunctionTool")
            .field("info", &self.info)
            .field("custom_unmarshal", &self.unmarshal.is_some())
            .finish()
    }
}

// ============================================================================
// StreamFunctionTool
// ============================================================================

/// A [`StreamableTool`] backed by an async function.
///
/// Arguments are decoded like [`FunctionTool`]. The function yields a stream
/// of `O`, and each `O` is encoded lazily as the caller reads; an encoding
/// failure arrives as the stream's error.
///
/// # Example
///
/// ```rust
/// use rill_streaming::StreamReader;
/// use rill_tools::{StreamFunctionTool, StreamableTool, ToolInfo, ToolOptions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct Query { name: String }
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tool = StreamFunctionTool::new(
///     ToolInfo::new("search_user", "search user info"),
///     |query: Query| async move {
///         Ok(StreamReader::from_vec(vec![User { name: query.name }]))
///     },
/// );
///
/// let chunks = tool
///     .stream_run(r#"{"name":"ada"}"#, &ToolOptions::new())
///     .await
///     .unwrap()
///     .drain()
///     .await
///     .unwrap();
/// assert_eq!(chunks, vec![r#"{"name":"ada"}"#]);
/// # }
/// ```
pub struct StreamFunctionTool<I, O> {
    info: ToolInfo,
    function: ToolFn<I, StreamReader<O>>,
    unmarshal: Option<UnmarshalFn<I>>,
    marshal: Option<MarshalFn<O>>,
}

impl<I: 'static, O: 'static> StreamFunctionTool<I, O> {
    /// Create a tool from a function of the decoded arguments.
    pub fn new<F, Fut>(info: ToolInfo, function: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StreamReader<O>, ToolError>> + Send + 'static,
    {
        Self::from_fn(info, plain_fn(function))
    }

    /// Create a tool whose function also receives the per-call options.
    pub fn optionable<F, Fut>(info: ToolInfo, function: F) -> Self
    where
        F: Fn(I, ToolOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StreamReader<O>, ToolError>> + Send + 'static,
    {
        Self::from_fn(info, optionable_fn(function))
    }

    fn from_fn(info: ToolInfo, function: ToolFn<I, StreamReader<O>>) -> Self {
        Self {
            info,
            function,
            unmarshal: None,
            marshal: None,
        }
    }

    /// Decode arguments with a custom function instead of serde.
    #[must_use]
    pub fn with_unmarshal<U>(mut self, unmarshal: U) -> Self
    where
        U: Fn(&str) -> anyhow::Result<I> + Send + Sync + 'static,
    {
        self.unmarshal = Some(Arc::new(unmarshal));
        self
    }

    /// Encode outputs with a custom function instead of serde.
    #[must_use]
    pub fn with_marshal<M>(mut self, marshal: M) -> Self
    where
        M: Fn(&O) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.marshal = Some(Arc::new(marshal));
        self
    }
}

impl<I, O> BaseTool for StreamFunctionTool<I, O> {
    fn info(&self) -> ToolInfo {
        self.info.clone()
    }
}

#[async_trait]
impl<I, O> StreamableTool for StreamFunctionTool<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    async fn stream_run(
        &self,
        arguments: &str,
        options: &ToolOptions,
    ) -> Result<StreamReader<String>, ToolError> {
        let tool_name = self.info.name.clone();
        debug!(tool_name = %tool_name, "running streamable tool");

        let input = decode_arguments(&tool_name, self.unmarshal.as_ref(), arguments)?;
        let outputs = (self.function)(input, options.clone()).await?;

        let marshal = self.marshal.clone();
        Ok(outputs.convert(move |output| {
            encode_output(&tool_name, marshal.as_ref(), &output).map_err(StreamError::producer)
        }))
    }
}

impl<I, O> std::fmt::Debug for StreamFunctionTool<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamFunctionTool")
            .field("info", &self.info)
            .field("custom_unmarshal", &self.unmarshal.is_some())
            .field("custom_marshal", &self.marshal.is_some())
            .finish()
    }
}

// ============================================================================
// EnhancedStreamFunctionTool
// ============================================================================

/// An [`EnhancedStreamableTool`] backed by an async function.
///
/// Argument handling matches [`StreamFunctionTool`]; the function's stream of
/// [`ToolResult`] chunks is returned as-is.
pub struct EnhancedStreamFunctionTool<I> {
    info: ToolInfo,
    function: ToolFn<I, StreamReader<ToolResult>>,
    unmarshal: Option<UnmarshalFn<I>>,
}

impl<I: 'static> EnhancedStreamFunctionTool<I> {
    /// Create a tool from a function of the decoded arguments.
    pub fn new<F, Fut>(info: ToolInfo, function: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StreamReader<ToolResult>, ToolError>> + Send + 'static,
    {
        Self::from_fn(info, plain_fn(function))
    }

    /// Create a tool whose function also receives the per-call options.
    pub fn optionable<F, Fut>(info: ToolInfo, function: F) -> Self
    where
        F: Fn(I, ToolOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StreamReader<ToolResult>, ToolError>> + Send + 'static,
    {
        Self::from_fn(info, optionable_fn(function))
    }

    fn from_fn(info: ToolInfo, function: ToolFn<I, StreamReader<ToolResult>>) -> Self {
        Self {
            info,
            function,
            unmarshal: None,
        }
    }

    /// Decode arguments with a custom function instead of serde.
    #[must_use]
    pub fn with_unmarshal<U>(mut self, unmarshal: U) -> Self
    where
        U: Fn(&str) -> anyhow::Result<I> + Send + Sync + 'static,
    {
        self.unmarshal = Some(Arc::new(unmarshal));
        self
    }
}

impl<I> BaseTool for EnhancedStreamFunctionTool<I> {
    fn info(&self) -> ToolInfo {
        self.info.clone()
    }
}

#[async_trait]
impl<I> EnhancedStreamableTool for EnhancedStreamFunctionTool<I>
where
    I: DeserializeOwned + Send + 'static,
{
    async fn stream_run(
        &self,
        argument: ToolArgument,
        options: &ToolOptions,
    ) -> Result<StreamReader<ToolResult>, ToolError> {
        debug!(tool_name = %self.info.name, "running enhanced streamable tool");
        let input = decode_arguments(&self.info.name, self.unmarshal.as_ref(), &argument.text)?;
        (self.function)(input, options.clone()).await
    }
}

impl<I> std::fmt::Debug for EnhancedStreamFunctionTool<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancedStreamFunctionTool")
            .field("info", &self.info)
            .field("custom_unmarshal", &self.unmarshal.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rill_core::messages::{concat_tool_results, ToolOutputPart};
    use rill_streaming::pipe;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Input {
        name: String,
    }

    #[derive(Debug, Serialize)]
    struct Output {
        name: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct SearchOptions {
        limit: usize,
    }

    impl Default for SearchOptions {
        fn default() -> Self {
            Self { limit: 1 }
        }
    }

    fn no_options() -> ToolOptions {
        ToolOptions::new()
    }

    fn search_user_info() -> ToolInfo {
        ToolInfo::new("search_user", "search user info").with_parameters(serde_json::json!({
            "type": "object",
            "properties": {"name": {"type": "string", "description": "user name"}},
        }))
    }

    fn search_user() -> impl StreamableTool {
        StreamFunctionTool::new(search_user_info(), |input: Input| async move {
            let (reader, mut writer) = pipe(2);
            writer.send(Output { name: input.name }).await;
            writer.send(Output { name: "lee".into() }).await;
            writer.close();
            Ok(reader)
        })
    }

    mod invokable {
        use super::*;
        use pretty_assertions::assert_eq;

        fn lookup_user() -> FunctionTool<Input, Output> {
            FunctionTool::new(search_user_info(), |input: Input| async move {
                Ok(Output { name: input.name })
            })
        }

        #[tokio::test]
        async fn test_invoke_simple_case() {
            let tool = lookup_user();
            assert_eq!(tool.info().name, "search_user");
            assert_eq!(tool.tool_type(), "SearchUser");

            let out = tool.invoke(r#"{"name":"xxx"}"#, &no_options()).await.unwrap();
            assert_eq!(out, r#"{"name":"xxx"}"#);
        }

        #[tokio::test]
        async fn test_invoke_bad_arguments() {
            let err = lookup_user().invoke("{", &no_options()).await.unwrap_err();
            assert_eq!(err.tool_name(), Some("search_user"));
            assert!(err
                .to_string()
                .starts_with("failed to unmarshal arguments, tool_name=search_user"));
        }

        #[tokio::test]
        async fn test_invoke_function_error_passes_through() {
            let tool = FunctionTool::new(search_user_info(), |_: Input| async move {
                Err::<Output, _>(ToolError::execution_failed("backend down"))
            });
            let err = tool.invoke(r#"{"name":"x"}"#, &no_options()).await.unwrap_err();
            assert_eq!(err.to_string(), "Tool execution failed: backend down");
        }

        #[tokio::test]
        async fn test_invoke_string_output_and_custom_codecs() {
            let echo = FunctionTool::new(ToolInfo::new("echo", "echo"), |input: Input| async move {
                Ok(input.name)
            });
            assert_eq!(echo.invoke(r#"{"name":"hi"}"#, &no_options()).await.unwrap(), "hi");

            let shout = FunctionTool::new(ToolInfo::new("shout", "shout"), |input: Input| async move {
                Ok(Output { name: input.name })
            })
            .with_unmarshal(|raw: &str| Ok(Input { name: raw.trim().to_string() }))
            .with_marshal(|out: &Output| Ok(out.name.to_uppercase()));
            assert_eq!(shout.invoke(" quiet ", &no_options()).await.unwrap(), "QUIET");

            let broken = FunctionTool::new(ToolInfo::new("broken", "broken"), |input: Input| async move {
                Ok(Output { name: input.name })
            })
            .with_marshal(|_: &Output| Err(anyhow::anyhow!("cannot encode")));
            let err = broken.invoke(r#"{"name":"a"}"#, &no_options()).await.unwrap_err();
            assert_eq!(
                err.to_string(),
                "failed to marshal output, tool_name=broken, err=cannot encode"
            );
        }

        #[tokio::test]
        async fn test_optionable_invoke_receives_options() {
            let tool = FunctionTool::optionable(
                search_user_info(),
                |input: Input, options: ToolOptions| async move {
                    let limit = options.apply(SearchOptions::default()).limit;
                    Ok(vec![input.name; limit])
                },
            );

            let out = tool.invoke(r#"{"name":"a"}"#, &no_options()).await.unwrap();
            assert_eq!(out, r#"["a"]"#);

            let options = ToolOptions::new().with(|o: &mut SearchOptions| o.limit = 3);
            let out = tool.invoke(r#"{"name":"a"}"#, &options).await.unwrap();
            assert_eq!(out, r#"["a","a","a"]"#);
        }

        #[tokio::test]
        async fn test_enhanced_invoke() {
            let tool = EnhancedFunctionTool::optionable(
                ToolInfo::new("enhanced_search", "search with structured output"),
                |input: QueryInput, options: ToolOptions| async move {
                    let limit = options.apply(SearchOptions::default()).limit;
                    Ok(ToolResult::text(format!("{} x{limit}", input.query)))
                },
            );
            assert_eq!(tool.tool_type(), "EnhancedSearch");

            let options = ToolOptions::new().with(|o: &mut SearchOptions| o.limit = 2);
            let out = tool
                .invoke(ToolArgument::new(r#"{"query":"rust"}"#), &options)
                .await
                .unwrap();
            assert_eq!(out.parts, vec![ToolOutputPart::text("rust x2")]);

            let err = tool.invoke("nope".into(), &options).await.unwrap_err();
            assert!(matches!(err, ToolError::Unmarshal { .. }));
        }

        #[tokio::test]
        async fn test_enhanced_invoke_custom_unmarshal() {
            let tool = EnhancedFunctionTool::new(
                ToolInfo::new("raw", "raw"),
                |input: QueryInput| async move { Ok(ToolResult::text(input.query)) },
            )
            .with_unmarshal(|raw: &str| Ok(QueryInput { query: raw.to_string() }));
            let out = tool.invoke("plain".into(), &no_options()).await.unwrap();
            assert_eq!(out.text_content(), "plain");
        }
    }

    #[tokio::test]
    async fn test_stream_tool_simple_case() {
        let tool = search_user();
        assert_eq!(tool.info().name, "search_user");
        assert_eq!(tool.tool_type(), "SearchUser");

        let chunks = tool
            .stream_run(r#"{"name":"xxx"}"#, &no_options())
            .await
            .unwrap()
            .drain()
            .await
            .unwrap();
        assert_eq!(chunks, vec![r#"{"name":"xxx"}"#, r#"{"name":"lee"}"#]);
    }

    #[tokio::test]
    async fn test_stream_tool_bad_arguments() {
        let err = search_user().stream_run("not json", &no_options()).await.unwrap_err();
        assert!(matches!(err, ToolError::Unmarshal { .. }));
        assert!(err
            .to_string()
            .starts_with("failed to unmarshal arguments, tool_name=search_user"));
    }

    #[tokio::test]
    async fn test_stream_tool_function_error() {
        let tool = StreamFunctionTool::new(search_user_info(), |_: Input| async move {
            Err::<StreamReader<Output>, _>(ToolError::execution_failed("backend down"))
        });
        let err = tool.stream_run(r#"{"name":"x"}"#, &no_options()).await.unwrap_err();
        assert_eq!(err.to_string(), "Tool execution failed: backend down");
    }

    #[tokio::test]
    async fn test_string_outputs_pass_through() {
        let tool = StreamFunctionTool::new(ToolInfo::new("echo", "echo"), |input: Input| async move {
            Ok(StreamReader::from_vec(vec![input.name, "done".to_string()]))
        });
        let chunks = tool
            .stream_run(r#"{"name":"hi"}"#, &no_options())
            .await
            .unwrap()
            .drain()
            .await
            .unwrap();
        assert_eq!(chunks, vec!["hi", "done"]);
    }

    #[tokio::test]
    async fn test_custom_marshal_and_unmarshal() {
        let tool = StreamFunctionTool::new(ToolInfo::new("upper", "shout"), |input: Input| async move {
            Ok(StreamReader::from_vec(vec![Output { name: input.name }]))
        })
        .with_unmarshal(|raw: &str| {
            Ok(Input {
                name: raw.trim().to_string(),
            })
        })
        .with_marshal(|out: &Output| Ok(out.name.to_uppercase()));

        let chunks = tool
            .stream_run("  quiet  ", &no_options())
            .await
            .unwrap()
            .drain()
            .await
            .unwrap();
        assert_eq!(chunks, vec!["QUIET"]);
    }

    #[tokio::test]
    async fn test_marshal_error_is_delivered_in_stream() {
        let tool = StreamFunctionTool::new(ToolInfo::new("broken", "broken"), |input: Input| async move {
            Ok(StreamReader::from_vec(vec![Output { name: input.name }]))
        })
        .with_marshal(|_: &Output| Err(anyhow::anyhow!("cannot encode")));

        let err = tool
            .stream_run(r#"{"name":"a"}"#, &no_options())
            .await
            .unwrap()
            .drain()
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to marshal output, tool_name=broken, err=cannot encode"
        );
    }

    #[tokio::test]
    async fn test_optionable_stream_tool() {
        let tool = StreamFunctionTool::optionable(
            search_user_info(),
            |input: Input, options: ToolOptions| async move {
                let limit = options.apply(SearchOptions::default()).limit;
                let users = (0..limit)
                    .map(|i| Output {
                        name: format!("{}{i}", input.name),
                    })
                    .collect();
                Ok(StreamReader::from_vec(users))
            },
        );

        let options = ToolOptions::new().with(|o: &mut SearchOptions| o.limit = 2);
        let chunks = tool
            .stream_run(r#"{"name":"u"}"#, &options)
            .await
            .unwrap()
            .drain()
            .await
            .unwrap();
        assert_eq!(chunks, vec![r#"{"name":"u0"}"#, r#"{"name":"u1"}"#]);
    }

    #[derive(Debug, Deserialize)]
    struct QueryInput {
        query: String,
    }

    fn enhanced_search() -> impl EnhancedStreamableTool {
        EnhancedStreamFunctionTool::new(
            ToolInfo::new("enhanced_stream_search", "search with enhanced stream output"),
            |input: QueryInput| async move {
                Ok(StreamReader::from_vec(vec![
                    ToolResult::text(format!("result for: {}", input.query)),
                    ToolResult::text("more results"),
                ]))
            },
        )
    }

    #[tokio::test]
    async fn test_enhanced_stream_tool_simple_case() {
        let tool = enhanced_search();
        assert_eq!(tool.info().name, "enhanced_stream_search");
        assert_eq!(tool.tool_type(), "EnhancedStreamSearch");

        let chunks = tool
            .stream_run(ToolArgument::new(r#"{"query":"test"}"#), &no_options())
            .await
            .unwrap()
            .drain()
            .await
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].parts, vec![ToolOutputPart::text("result for: test")]);
        assert_eq!(chunks[1].parts, vec![ToolOutputPart::text("more results")]);

        let merged = concat_tool_results(&chunks).unwrap();
        assert_eq!(merged.text_content(), "result for: testmore results");
    }

    #[tokio::test]
    async fn test_enhanced_stream_tool_bad_arguments() {
        let err = enhanced_search()
            .stream_run(ToolArgument::new("{"), &no_options())
            .await
            .unwrap_err();
        assert_eq!(err.tool_name(), Some("enhanced_stream_search"));
    }

    #[tokio::test]
    async fn test_enhanced_custom_unmarshal() {
        let info = enhanced_search().info();
        let custom = EnhancedStreamFunctionTool::new(info, |input: QueryInput| async move {
            Ok(StreamReader::from_vec(vec![ToolResult::text(input.query)]))
        })
        .with_unmarshal(|raw: &str| Ok(QueryInput { query: raw.to_string() }));

        let out = custom
            .stream_run("plain text".into(), &no_options())
            .await
            .unwrap()
            .concat()
            .await
            .unwrap();
        assert_eq!(out.text_content(), "plain text");
    }

    #[tokio::test]
    async fn test_optionable_enhanced_stream_tool() {
        let tool = EnhancedStreamFunctionTool::optionable(
            ToolInfo::new("paged_search", "search in pages"),
            |input: QueryInput, options: ToolOptions| async move {
                let pages = options.apply(SearchOptions::default()).limit;
                let chunks = (0..pages)
                    .map(|page| ToolResult::text(format!("{}#{page} ", input.query)))
                    .collect();
                Ok(StreamReader::from_vec(chunks))
            },
        );

        let options = ToolOptions::new().with(|o: &mut SearchOptions| o.limit = 3);
        let out = tool
            .stream_run(r#"{"query":"q"}"#.into(), &options)
            .await
            .unwrap()
            .concat()
            .await
            .unwrap();
        assert_eq!(out.text_content(), "q#0 q#1 q#2 ");
    }

    #[tokio::test]
    async fn test_boxed_tools() {
        let tools: Vec<BoxedStreamableTool> = vec![Arc::new(search_user())];
        let names: Vec<_> = tools.iter().map(|t| t.info().name).collect();
        assert_eq!(names, vec!["search_user"]);

        let enhanced: BoxedEnhancedStreamableTool = Arc::new(enhanced_search());
        assert_eq!(enhanced.tool_type(), "EnhancedStreamSearch");

        let invokable: BoxedInvokableTool = Arc::new(FunctionTool::new(
            ToolInfo::new("ping", "ping"),
            |_: serde_json::Value| async move { Ok("pong".to_string()) },
        ));
        assert_eq!(invokable.invoke("{}", &no_options()).await.unwrap(), "pong");

        let enhanced_invokable: BoxedEnhancedInvokableTool = Arc::new(EnhancedFunctionTool::new(
            ToolInfo::new("ping", "ping"),
            |_: serde_json::Value| async move { Ok(ToolResult::text("pong")) },
        ));
        assert_eq!(enhanced_invokable.tool_type(), "Ping");
    }
}
