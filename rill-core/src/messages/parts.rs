//! Multi-modal message parts.
//!
//! Three families of parts live on a [`Message`](super::Message):
//!
//! - [`MessageInputPart`]: structured user input (text, image, audio, video, file)
//! - [`MessageOutputPart`]: structured model output, produced incrementally
//! - [`ChatMessagePart`]: the legacy flat URL-based representation
//!
//! Rich media share one shape, [`MessagePartCommon`], which carries either a
//! reference URL or an inline base64 payload plus a MIME type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Type tag of a message part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    /// Plain text.
    #[default]
    Text,
    /// Image.
    ImageUrl,
    /// Audio.
    AudioUrl,
    /// Video.
    VideoUrl,
    /// File or document.
    FileUrl,
}

impl PartType {
    /// Wire name of the tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::ImageUrl => "image_url",
            Self::AudioUrl => "audio_url",
            Self::VideoUrl => "video_url",
            Self::FileUrl => "file_url",
        }
    }

    /// Short media name, e.g. `"image"`.
    #[must_use]
    pub fn media_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::ImageUrl => "image",
            Self::AudioUrl => "audio",
            Self::VideoUrl => "video",
            Self::FileUrl => "file",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested fidelity for image understanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    /// High resolution.
    High,
    /// Low resolution.
    Low,
    /// Let the provider decide.
    #[default]
    Auto,
}

/// Shared shape of every rich-media part.
///
/// At most one of `url` and `base64_data` is expected to be set. An empty
/// string inside `Some` is kept as-is and is distinct from `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePartCommon {
    /// Reference URL (http(s) or data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Inline base64-encoded payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_data: Option<String>,
    /// MIME type, e.g. `"audio/wav"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    /// Provider-specific metadata.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl MessagePartCommon {
    /// Media referenced by URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Media carried inline as base64.
    pub fn from_base64(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64_data: Some(data.into()),
            mime_type: mime_type.into(),
            ..Default::default()
        }
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Non-empty URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|s| !s.is_empty())
    }

    /// Non-empty base64 payload, if any.
    #[must_use]
    pub fn base64_data(&self) -> Option<&str> {
        self.base64_data.as_deref().filter(|s| !s.is_empty())
    }
}

/// Image supplied as user input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInputImage {
    /// URL or payload.
    #[serde(flatten)]
    pub common: MessagePartCommon,
    /// Requested fidelity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

impl From<MessagePartCommon> for MessageInputImage {
    fn from(common: MessagePartCommon) -> Self {
        Self {
            common,
            detail: None,
        }
    }
}

/// A structured user-input part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInputPart {
    /// Part type.
    #[serde(rename = "type")]
    pub kind: PartType,
    /// Text, for text parts.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Image payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MessageInputImage>,
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

impl MessageInputPart {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: PartType::Text,
            text: text.into(),
            ..Default::default()
        }
    }

    /// An image part.
    pub fn image(image: impl Into<MessageInputImage>) -> Self {
        Self {
            kind: PartType::ImageUrl,
            image: Some(image.into()),
            ..Default::default()
        }
    }

    /// An audio part.
    pub fn audio(audio: MessagePartCommon) -> Self {
        Self {
            kind: PartType::AudioUrl,
            audio: Some(audio),
            ..Default::default()
        }
    }

    /// A video part.
    pub fn video(video: MessagePartCommon) -> Self {
        Self {
            kind: PartType::VideoUrl,
            video: Some(video),
            ..Default::default()
        }
    }

    /// A file part.
    pub fn file(file: MessagePartCommon) -> Self {
        Self {
            kind: PartType::FileUrl,
            file: Some(file),
            ..Default::default()
        }
    }

    /// The media payload matching this part's type.
    #[must_use]
    pub fn media(&self) -> Option<&MessagePartCommon> {
        match self.kind {
            PartType::Text => None,
            PartType::ImageUrl => self.image.as_ref().map(|i| &i.common),
            PartType::AudioUrl => self.audio.as_ref(),
            PartType::VideoUrl => self.video.as_ref(),
            PartType::FileUrl => self.file.as_ref(),
        }
    }

    pub(crate) fn media_mut(&mut self) -> Option<&mut MessagePartCommon> {
        match self.kind {
            PartType::Text => None,
            PartType::ImageUrl => self.image.as_mut().map(|i| &mut i.common),
            PartType::AudioUrl => self.audio.as_mut(),
            PartType::VideoUrl => self.video.as_mut(),
            PartType::FileUrl => self.file.as_mut(),
        }
    }
}

/// A structured part generated by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageOutputPart {
    /// Part type.
    #[serde(rename = "type")]
    pub kind: PartType,
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

impl MessageOutputPart {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: PartType::Text,
            text: text.into(),
            ..Default::default()
        }
    }

    /// An image part.
    pub fn image(image: MessagePartCommon) -> Self {
        Self {
            kind: PartType::ImageUrl,
            image: Some(image),
            ..Default::default()
        }
    }

    /// An audio part.
    pub fn audio(audio: MessagePartCommon) -> Self {
        Self {
            kind: PartType::AudioUrl,
            audio: Some(audio),
            ..Default::default()
        }
    }

    /// A video part.
    pub fn video(video: MessagePartCommon) -> Self {
        Self {
            kind: PartType::VideoUrl,
            video: Some(video),
            ..Default::default()
        }
    }

    /// A file part.
    pub fn file(file: MessagePartCommon) -> Self {
        Self {
            kind: PartType::FileUrl,
            file: Some(file),
            ..Default::default()
        }
    }

    /// The media payload matching this part's type.
    #[must_use]
    pub fn media(&self) -> Option<&MessagePartCommon> {
        match self.kind {
            PartType::Text => None,
            PartType::ImageUrl => self.image.as_ref(),
            PartType::AudioUrl => self.audio.as_ref(),
            PartType::VideoUrl => self.video.as_ref(),
            PartType::FileUrl => self.file.as_ref(),
        }
    }
}

/// Image reference in the legacy part representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageImageUrl {
    /// Image URL.
    pub url: String,
    /// Requested fidelity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
}

/// Audio, video or file reference in the legacy part representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageMediaUrl {
    /// Media URL.
    pub url: String,
    /// MIME type.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
}

impl ChatMessageMediaUrl {
    /// Reference by URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: String::new(),
        }
    }
}

/// A part in the legacy flat multi-content representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessagePart {
    /// Part type.
    #[serde(rename = "type")]
    pub kind: PartType,
    /// Text, for text parts.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ChatMessageImageUrl>,
    /// Audio reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<ChatMessageMediaUrl>,
    /// Video reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<ChatMessageMediaUrl>,
    /// File reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<ChatMessageMediaUrl>,
}

impl ChatMessagePart {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: PartType::Text,
            text: text.into(),
            ..Default::default()
        }
    }

    /// An image part referenced by URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            kind: PartType::ImageUrl,
            image_url: Some(ChatMessageImageUrl {
                url: url.into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// An audio part referenced by URL.
    pub fn audio_url(url: impl Into<String>) -> Self {
        Self {
            kind: PartType::AudioUrl,
            audio_url: Some(ChatMessageMediaUrl::new(url)),
            ..Default::default()
        }
    }

    /// A video part referenced by URL.
    pub fn video_url(url: impl Into<String>) -> Self {
        Self {
            kind: PartType::VideoUrl,
            video_url: Some(ChatMessageMediaUrl::new(url)),
            ..Default::default()
        }
    }

    /// A file part referenced by URL.
    pub fn file_url(url: impl Into<String>) -> Self {
        Self {
            kind: PartType::FileUrl,
            file_url: Some(ChatMessageMediaUrl::new(url)),
            ..Default::default()
        }
    }

    /// URL of the media reference matching this part's type.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self.kind {
            PartType::Text => None,
            PartType::ImageUrl => self.image_url.as_ref().map(|u| u.url.as_str()),
            PartType::AudioUrl => self.audio_url.as_ref().map(|u| u.url.as_str()),
            PartType::VideoUrl => self.video_url.as_ref().map(|u| u.url.as_str()),
            PartType::FileUrl => self.file_url.as_ref().map(|u| u.url.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_part_type_serde() {
        let json = serde_json::to_string(&PartType::ImageUrl).unwrap();
        assert_eq!(json, "\"image_url\"");
        assert_eq!(PartType::AudioUrl.media_name(), "audio");
    }

    #[test]
    fn test_input_image_flattens_common() {
        let part = MessageInputPart::image(MessageInputImage {
            common: MessagePartCommon::from_url("https://example.com/a.png"),
            detail: Some(ImageDetail::High),
        });
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "image_url",
                "image": {"url": "https://example.com/a.png", "detail": "high"}
            })
        );
        let back: MessageInputPart = serde_json::from_value(json).unwrap();
        assert_eq!(back, part);
    }

    #[test]
    fn test_empty_url_is_not_a_url() {
        let common = MessagePartCommon {
            url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(common.url(), None);
        assert!(common.url.is_some());
    }

    #[test]
    fn test_media_accessor_follows_type() {
        let part = MessageOutputPart::audio(MessagePartCommon::from_base64("AAA", "audio/wav"));
        assert_eq!(part.media().and_then(|m| m.base64_data()), Some("AAA"));
        assert!(MessageOutputPart::text("x").media().is_none());
        assert_eq!(
            ChatMessagePart::video_url("v.mp4").url(),
            Some("v.mp4")
        );
    }
}
