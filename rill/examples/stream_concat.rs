//! Streams a tool-calling answer, fans it out and reconciles it.
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run --example stream_concat --features tools
//! ```

use rill::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Forecast {
    city: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Render the prompt.
    let template = ChatTemplate::new(FormatType::FString)
        .with_message(Message::system("You are a {tone} weather assistant."))
        .with_placeholder("history", true)
        .with_message(Message::user("What is the weather in {city}?"));

    let mut vars = Variables::new();
    vars.insert("tone".into(), "concise".into());
    vars.insert("city".into(), "Lisbon".into());
    let prompt = template.format(&vars)?;
    for message in &prompt {
        println!("prompt> {message}");
    }

    // Simulated model output: text and one tool call split across chunks.
    let (reader, mut writer) = pipe(4);
    tokio::spawn(async move {
        let chunks = vec![
            Message::assistant("Let me ", vec![]).with_role(Role::Assistant),
            Message::assistant(
                "check.",
                vec![ToolCall::function("call_1", "get_forecast", "").with_index(0)],
            ),
            Message::assistant("", vec![ToolCall::fragment(0, r#"{"city":"#)]),
            Message::assistant("", vec![ToolCall::fragment(0, r#""Lisbon"}"#)]).with_response_meta(
                ResponseMeta::new()
                    .with_finish_reason("tool_calls")
                    .with_usage(TokenUsage::with_tokens(42, 17)),
            ),
        ];
        for chunk in chunks {
            if writer.send(chunk).await {
                break;
            }
        }
    });

    // One copy is logged live, the other reduced.
    let mut copies = reader.copy(2);
    let live = copies.pop().expect("two copies");
    let reduced = copies.pop().expect("two copies");

    let printer = tokio::spawn(async move {
        let mut live = live;
        while let Some(chunk) = live.recv().await? {
            tracing::debug!(content = %chunk.content, "chunk");
        }
        Ok::<_, StreamError>(())
    });

    let answer = reduced.concat().await?;
    printer.await??;
    println!("assistant> {answer}");

    // Run the requested tool and reconcile its streamed result.
    let tool = EnhancedStreamFunctionTool::new(
        ToolInfo::new("get_forecast", "Weather forecast for a city"),
        |args: Forecast| async move {
            Ok(StreamReader::from_vec(vec![
                ToolResult::text(format!("{}: ", args.city)),
                ToolResult::text("sunny, 24°C"),
            ]))
        },
    );

    for call in &answer.tool_calls {
        let result = tool
            .stream_run(call.function.arguments.clone().into(), &ToolOptions::new())
            .await?
            .concat()
            .await?;
        println!("{} ({})> {}", tool.tool_type(), call.id, result.text_content());
    }

    Ok(())
}
