//! Human-readable rendering of messages for logs and debugging.

use std::fmt;

use super::message::Message;
use super::parts::{MessagePartCommon, PartType};

fn write_media(
    f: &mut fmt::Formatter<'_>,
    index: usize,
    kind: PartType,
    media: Option<&MessagePartCommon>,
) -> fmt::Result {
    write!(f, "  [{index}] {}: ", kind.media_name())?;
    let Some(media) = media else {
        return writeln!(f, "<nil>");
    };
    let mut sep = "";
    if let Some(url) = media.url() {
        write!(f, "url={url}")?;
        sep = " ";
    } else if let Some(data) = media.base64_data() {
        write!(f, "base64[{}]", data.len())?;
        sep = " ";
    }
    if !media.mime_type.is_empty() {
        write!(f, "{sep}mime={}", media.mime_type)?;
    }
    writeln!(f)
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = self.role.map(|r| r.as_str()).unwrap_or_default();
        writeln!(f, "{role}: {}", self.content)?;

        if !self.reasoning_content.is_empty() {
            writeln!(f, "reasoning content:\n{}", self.reasoning_content)?;
        }

        if !self.user_input_multi_content.is_empty() {
            writeln!(f, "user_input_multi_content:")?;
            for (i, part) in self.user_input_multi_content.iter().enumerate() {
                match part.kind {
                    PartType::Text => writeln!(f, "  [{i}] text: {}", part.text)?,
                    kind => write_media(f, i, kind, part.media())?,
                }
            }
        }

        if !self.assistant_gen_multi_content.is_empty() {
            writeln!(f, "assistant_gen_multi_content:")?;
            for (i, part) in self.assistant_gen_multi_content.iter().enumerate() {
                match part.kind {
                    PartType::Text => writeln!(f, "  [{i}] text: {}", part.text)?,
                    kind => write_media(f, i, kind, part.media())?,
                }
            }
        }

        if !self.multi_content.is_empty() {
            writeln!(f, "multi_content:")?;
            for (i, part) in self.multi_content.iter().enumerate() {
                match part.kind {
                    PartType::Text => writeln!(f, "  [{i}] text: {}", part.text)?,
                    kind => writeln!(f, "  [{i}] {kind}: {}", part.url().unwrap_or("<nil>"))?,
                }
            }
        }

        if !self.tool_calls.is_empty() {
            writeln!(f, "tool_calls:")?;
            for call in &self.tool_calls {
                match call.index {
                    Some(index) => write!(f, "index[{index}]: ")?,
                    None => write!(f, "- ")?,
                }
                writeln!(
                    f,
                    "id={} type={} name={} arguments={}",
                    call.id, call.kind, call.function.name, call.function.arguments
                )?;
            }
        }

        if !self.tool_call_id.is_empty() {
            writeln!(f, "tool_call_id: {}", self.tool_call_id)?;
        }
        if !self.tool_name.is_empty() {
            writeln!(f, "tool_call_name: {}", self.tool_name)?;
        }

        if let Some(meta) = &self.response_meta {
            if !meta.finish_reason.is_empty() {
                writeln!(f, "finish_reason: {}", meta.finish_reason)?;
            }
            if let Some(usage) = &meta.usage {
                writeln!(
                    f,
                    "usage: prompt_tokens={} completion_tokens={} total_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                )?;
            }
        }
        Ok(())
    }
}
