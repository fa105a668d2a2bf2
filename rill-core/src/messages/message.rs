//! The chat message record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::parts::{ChatMessagePart, MessageInputPart, MessageOutputPart};
use super::tool_call::ToolCall;
use crate::usage::TokenUsage;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End user.
    User,
    /// The model.
    Assistant,
    /// A tool result.
    Tool,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alternative token and its log-probability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopLogProb {
    /// Token text.
    pub token: String,
    /// Log-probability of the token.
    pub logprob: f64,
    /// UTF-8 bytes of the token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bytes: Vec<i64>,
}

/// Log-probability information for one generated token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogProb {
    /// Token text.
    pub token: String,
    /// Log-probability of the token.
    pub logprob: f64,
    /// UTF-8 bytes of the token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bytes: Vec<i64>,
    /// Most likely alternatives at this position.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_logprobs: Vec<TopLogProb>,
}

/// Per-token log-probabilities of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogProbs {
    /// One entry per generated token, in order.
    #[serde(default)]
    pub content: Vec<LogProb>,
}

/// Response metadata reported by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Why generation stopped, e.g. `"stop"` or `"tool_calls"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub finish_reason: String,
    /// Token usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Token log-probabilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<LogProbs>,
}

impl ResponseMeta {
    /// Create empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the finish reason.
    #[must_use]
    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = reason.into();
        self
    }

    /// Set the usage.
    #[must_use]
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Set the log-probabilities.
    #[must_use]
    pub fn with_logprobs(mut self, logprobs: LogProbs) -> Self {
        self.logprobs = Some(logprobs);
        self
    }
}

/// A chat message, or one chunk of a streamed message.
///
/// Intermediate chunks of a streamed response usually leave `role` unset and
/// carry only a slice of `content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author; `None` on chunks that do not repeat it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Plain text content.
    #[serde(default)]
    pub content: String,

    /// Reasoning text produced before the answer.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reasoning_content: String,

    /// Legacy flat multi-part content.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multi_content: Vec<ChatMessagePart>,

    /// Structured user input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_input_multi_content: Vec<MessageInputPart>,

    /// Structured model output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assistant_gen_multi_content: Vec<MessageOutputPart>,

    /// Participant name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Tool calls requested by the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// ID of the call this message answers (role = tool).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tool_call_id: String,

    /// Name of the tool that produced this message (role = tool).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tool_name: String,

    /// Response metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_meta: Option<ResponseMeta>,

    /// Provider-specific metadata.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            content: content.into(),
            ..Default::default()
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// A tool result message answering `tool_call_id`.
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            ..Self::new(Role::Tool, content)
        }
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the participant name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the tool name.
    #[must_use]
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    /// Set the reasoning content.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning_content = reasoning.into();
        self
    }

    /// Add a structured user-input part.
    #[must_use]
    pub fn with_input_part(mut self, part: MessageInputPart) -> Self {
        self.user_input_multi_content.push(part);
        self
    }

    /// Add a structured output part.
    #[must_use]
    pub fn with_output_part(mut self, part: MessageOutputPart) -> Self {
        self.assistant_gen_multi_content.push(part);
        self
    }

    /// Add a legacy multi-content part.
    #[must_use]
    pub fn with_multi_part(mut self, part: ChatMessagePart) -> Self {
        self.multi_content.push(part);
        self
    }

    /// Set the response metadata.
    #[must_use]
    pub fn with_response_meta(mut self, meta: ResponseMeta) -> Self {
        self.response_meta = Some(meta);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Finish reason, if reported.
    #[must_use]
    pub fn finish_reason(&self) -> Option<&str> {
        self.response_meta
            .as_ref()
            .map(|m| m.finish_reason.as_str())
            .filter(|r| !r.is_empty())
    }

    /// Token usage, if reported.
    #[must_use]
    pub fn usage(&self) -> Option<&TokenUsage> {
        self.response_meta.as_ref().and_then(|m| m.usage.as_ref())
    }
}
