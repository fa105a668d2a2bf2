//! Reducers for the domain records.
//!
//! | field | policy |
//! |-------|--------|
//! | role, name, tool_call_id, tool_name | first non-empty, conflict on a differing later value |
//! | content, reasoning_content, tool call arguments | append |
//! | tool call id / type / function name (per index) | first non-empty, conflict |
//! | finish_reason, usage | last non-empty, whole value |
//! | logprobs | append |
//! | assistant output parts | text joins preceding text, audio joins preceding audio |
//! | user input parts, legacy parts | append |
//! | extra | union, later key wins |

use std::collections::HashMap;

use super::message::{LogProbs, Message, ResponseMeta};
use super::parts::{MessageOutputPart, PartType};
use super::tool_call::ToolCall;
use super::tool_result::{ToolOutputPart, ToolPartType, ToolResult};
use crate::concat::policy::{append, first_non_empty, last_non_empty, union_maps};
use crate::concat::{concat_slice, Concat};
use crate::errors::{ConcatResult, ConflictError, ConflictKind};

// Conditional tracing - use no-op macros when tracing feature is disabled
#[cfg(feature = "tracing-integration")]
use tracing::{debug, trace};

#[cfg(not(feature = "tracing-integration"))]
macro_rules! debug { ($($arg:tt)*) => {} }
#[cfg(not(feature = "tracing-integration"))]
macro_rules! trace { ($($arg:tt)*) => {} }

/// Reduce message chunks into one message.
pub fn concat_messages(chunks: &[Message]) -> ConcatResult<Message> {
    concat_slice(chunks)
}

/// Merge tool-call fragments.
///
/// Calls without an index come first, unchanged and in input order. Calls
/// sharing an index are merged into one, in order of first appearance of
/// each index.
pub fn concat_tool_calls(calls: &[ToolCall]) -> ConcatResult<Vec<ToolCall>> {
    let mut out = Vec::new();
    let mut order = Vec::new();
    let mut groups: HashMap<usize, Vec<&ToolCall>> = HashMap::new();

    for call in calls {
        match call.index {
            None => out.push(call.clone()),
            Some(index) => groups
                .entry(index)
                .or_insert_with(|| {
                    order.push(index);
                    Vec::new()
                })
                .push(call),
        }
    }

    for index in order {
        if let Some(fragments) = groups.get(&index) {
            out.push(ToolCall::concat_refs(fragments)?);
        }
    }
    Ok(out)
}

/// Reduce tool-result chunks into one result.
///
/// An empty input yields an empty result.
pub fn concat_tool_results(chunks: &[ToolResult]) -> ConcatResult<ToolResult> {
    concat_slice(chunks)
}

impl Concat for Message {
    const KIND: &'static str = "message";

    fn concat_refs(chunks: &[&Self]) -> ConcatResult<Self> {
        reduce_messages(chunks).map_err(|err| {
            debug!(error = %err, chunks = chunks.len(), "message concatenation failed");
            err
        })
    }
}

fn reduce_messages(chunks: &[&Message]) -> ConcatResult<Message> {
    let mut out = Message::default();
    let mut tool_calls: Vec<ToolCall> = Vec::new();
    let mut meta: Option<ResponseMeta> = None;

    for chunk in chunks {
        first_non_empty(&mut out.role, &chunk.role, ConflictKind::Role)?;
        first_non_empty(&mut out.name, &chunk.name, ConflictKind::Name)?;
        first_non_empty(&mut out.tool_call_id, &chunk.tool_call_id, ConflictKind::ToolCallId)?;
        first_non_empty(&mut out.tool_name, &chunk.tool_name, ConflictKind::ToolName)?;

        append(&mut out.content, &chunk.content);
        append(&mut out.reasoning_content, &chunk.reasoning_content);
        append(&mut out.multi_content, &chunk.multi_content);
        append(&mut out.user_input_multi_content, &chunk.user_input_multi_content);
        merge_output_parts(
            &mut out.assistant_gen_multi_content,
            &chunk.assistant_gen_multi_content,
        );
        tool_calls.extend(chunk.tool_calls.iter().cloned());
        union_maps(&mut out.extra, &chunk.extra);

        if let Some(next) = &chunk.response_meta {
            let acc = meta.get_or_insert_with(ResponseMeta::default);
            last_non_empty(&mut acc.finish_reason, &next.finish_reason);
            last_non_empty(&mut acc.usage, &next.usage);
            if let Some(logprobs) = &next.logprobs {
                acc.logprobs
                    .get_or_insert_with(LogProbs::default)
                    .content
                    .extend(logprobs.content.iter().cloned());
            }
        }
    }

    out.tool_calls = concat_tool_calls(&tool_calls)?;
    out.response_meta = meta;
    trace!(chunks = chunks.len(), content_len = out.content.len(), "messages concatenated");
    Ok(out)
}

fn merge_output_parts(acc: &mut Vec<MessageOutputPart>, next: &[MessageOutputPart]) {
    for part in next {
        match acc.last_mut() {
            Some(prev) if prev.kind == PartType::Text && part.kind == PartType::Text => {
                prev.text.push_str(&part.text);
                union_maps(&mut prev.extra, &part.extra);
            }
            Some(prev) if prev.kind == PartType::AudioUrl && part.kind == PartType::AudioUrl => {
                merge_output_audio(prev, part);
            }
            _ => acc.push(part.clone()),
        }
    }
}

fn merge_output_audio(prev: &mut MessageOutputPart, part: &MessageOutputPart) {
    union_maps(&mut prev.extra, &part.extra);
    let Some(next) = &part.audio else {
        return;
    };
    if prev.audio.is_none() {
        prev.audio = Some(next.clone());
        return;
    }
    let Some(acc) = prev.audio.as_mut() else {
        return;
    };
    append(&mut acc.base64_data, &next.base64_data);
    last_non_empty(&mut acc.url, &next.url);
    last_non_empty(&mut acc.mime_type, &next.mime_type);
    union_maps(&mut acc.extra, &next.extra);
}

/// Fragments of a single call: identity fields fixed once, arguments appended.
impl Concat for ToolCall {
    const KIND: &'static str = "tool call";

    fn concat_refs(chunks: &[&Self]) -> ConcatResult<Self> {
        let mut out = ToolCall::default();
        for chunk in chunks {
            if out.index.is_none() {
                out.index = chunk.index;
            }
            first_non_empty(&mut out.id, &chunk.id, ConflictKind::ToolCallFragmentId)?;
            first_non_empty(&mut out.kind, &chunk.kind, ConflictKind::ToolCallFragmentType)?;
            first_non_empty(
                &mut out.function.name,
                &chunk.function.name,
                ConflictKind::ToolCallFragmentName,
            )?;
            append(&mut out.function.arguments, &chunk.function.arguments);
            union_maps(&mut out.extra, &chunk.extra);
        }
        Ok(out)
    }
}

impl Concat for ToolResult {
    const KIND: &'static str = "tool result";

    fn concat_empty() -> ConcatResult<Self> {
        Ok(ToolResult::default())
    }

    /// Absent chunks are skipped rather than rejected.
    fn concat_chunks(chunks: &[Option<Self>]) -> ConcatResult<Self> {
        let present: Vec<&ToolResult> = chunks.iter().flatten().collect();
        if present.is_empty() {
            return Self::concat_empty();
        }
        Self::concat_refs(&present)
    }

    fn concat_refs(chunks: &[&Self]) -> ConcatResult<Self> {
        let mut parts: Vec<ToolOutputPart> = Vec::new();
        let mut media_slots: HashMap<ToolPartType, usize> = HashMap::new();

        for chunk in chunks {
            for part in merge_adjacent_text(&chunk.parts) {
                if !part.kind.is_media() {
                    parts.push(part);
                    continue;
                }
                match media_slots.get(&part.kind) {
                    Some(&slot) => merge_tool_media(&mut parts[slot], &part).map_err(|err| {
                        debug!(error = %err, "tool result concatenation failed");
                        err
                    })?,
                    None => {
                        media_slots.insert(part.kind, parts.len());
                        parts.push(part);
                    }
                }
            }
        }
        Ok(ToolResult { parts })
    }
}

fn merge_adjacent_text(parts: &[ToolOutputPart]) -> Vec<ToolOutputPart> {
    let mut out: Vec<ToolOutputPart> = Vec::with_capacity(parts.len());
    for part in parts {
        match out.last_mut() {
            Some(prev) if prev.kind == ToolPartType::Text && part.kind == ToolPartType::Text => {
                prev.text.push_str(&part.text);
                union_maps(&mut prev.extra, &part.extra);
            }
            _ => out.push(part.clone()),
        }
    }
    out
}

fn merge_tool_media(
    existing: &mut ToolOutputPart,
    incoming: &ToolOutputPart,
) -> Result<(), ConflictError> {
    let media = existing.kind.as_str();
    union_maps(&mut existing.extra, &incoming.extra);

    let Some(next) = incoming.media_payload() else {
        return Ok(());
    };
    let Some(slot) = existing.media_slot_mut() else {
        return Ok(());
    };
    if slot.is_none() {
        *slot = Some(next.clone());
        return Ok(());
    }
    let Some(acc) = slot.as_mut() else {
        return Ok(());
    };

    first_non_empty(&mut acc.url, &next.url, ConflictKind::Media { media, field: "url" })?;
    first_non_empty(
        &mut acc.base64_data,
        &next.base64_data,
        ConflictKind::Media {
            media,
            field: "base64_data",
        },
    )?;
    first_non_empty(
        &mut acc.mime_type,
        &next.mime_type,
        ConflictKind::Media {
            media,
            field: "mime_type",
        },
    )?;
    union_maps(&mut acc.extra, &next.extra);

    if let (Some(url), Some(data)) = (acc.url(), acc.base64_data()) {
        return Err(ConflictError::new(
            ConflictKind::Media {
                media,
                field: "url and base64_data",
            },
            url,
            format!("base64[{}]", data.len()),
        ));
    }
    Ok(())
}
