//! Structured multi-modal tool results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::parts::MessagePartCommon;

/// Type tag of a tool output part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolPartType {
    /// Plain text.
    #[default]
    Text,
    /// Image.
    Image,
    /// Audio.
    Audio,
    /// Video.
    Video,
    /// File or document.
    File,
}

impl ToolPartType {
    /// Wire name of the tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::File => "file",
        }
    }

    /// True for image, audio, video and file.
    #[must_use]
    pub fn is_media(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl fmt::Display for ToolPartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a tool result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutputPart {
    /// Part type.
    #[serde(rename = "type")]
    pub kind: ToolPartType,
    /// Text, for text parts.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Image payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MessagePartCommon>,
    /// Audio payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<MessagePartCommon>,
    /// Video payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<MessagePartCommon>,
    /// File payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<MessagePartCommon>,
    /// Provider-specific metadata.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ToolOutputPart {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ToolPartType::Text,
            text: text.into(),
            ..Default::default()
        }
    }

    /// A media part of the given type.
    ///
    /// Passing [`ToolPartType::Text`] yields an empty text part.
    pub fn media(kind: ToolPartType, media: MessagePartCommon) -> Self {
        let mut part = Self {
            kind,
            ..Default::default()
        };
        if let Some(slot) = part.media_slot_mut() {
            *slot = Some(media);
        }
        part
    }

    /// An image part.
    pub fn image(image: MessagePartCommon) -> Self {
        Self::media(ToolPartType::Image, image)
    }

    /// An audio part.
    pub fn audio(audio: MessagePartCommon) -> Self {
        Self::media(ToolPartType::Audio, audio)
    }

    /// A video part.
    pub fn video(video: MessagePartCommon) -> Self {
        Self::media(ToolPartType::Video, video)
    }

    /// A file part.
    pub fn file(file: MessagePartCommon) -> Self {
        Self::media(ToolPartType::File, file)
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The media payload matching this part's type.
    #[must_use]
    pub fn media_payload(&self) -> Option<&MessagePartCommon> {
        match self.kind {
            ToolPartType::Text => None,
            ToolPartType::Image => self.image.as_ref(),
            ToolPartType::Audio => self.audio.as_ref(),
            ToolPartType::Video => self.video.as_ref(),
            ToolPartType::File => self.file.as_ref(),
        }
    }

    pub(crate) fn media_slot_mut(&mut self) -> Option<&mut Option<MessagePartCommon>> {
        match self.kind {
            ToolPartType::Text => None,
            ToolPartType::Image => Some(&mut self.image),
            ToolPartType::Audio => Some(&mut self.audio),
            ToolPartType::Video => Some(&mut self.video),
            ToolPartType::File => Some(&mut self.file),
        }
    }
}

/// The structured result of a tool invocation, or one chunk of a streamed one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Ordered parts.
    #[serde(default)]
    pub parts: Vec<ToolOutputPart>,
}

impl ToolResult {
    /// Create an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A result holding one text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ToolOutputPart::text(text)],
        }
    }

    /// A result holding the given parts.
    #[must_use]
    pub fn from_parts(parts: Vec<ToolOutputPart>) -> Self {
        Self { parts }
    }

    /// Append a part.
    #[must_use]
    pub fn with_part(mut self, part: ToolOutputPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter(|p| p.kind == ToolPartType::Text)
            .map(|p| p.text.as_str())
            .collect()
    }

    /// Check if the result has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
