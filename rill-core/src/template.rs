//! Variable substitution into messages.
//!
//! Three placeholder dialects are supported:
//!
//! | dialect | syntax | undefined variable |
//! |---------|--------|--------------------|
//! | [`FormatType::FString`] | `{name}`, `{{`/`}}` escape braces | left as written |
//! | [`FormatType::Jinja2`] | `{{ name }}` | rendered empty |
//! | [`FormatType::GoTemplate`] | `{{.name}}` | [`TemplateError::MissingVariable`] |
//!
//! Jinja2 and Go-template placeholders may use a dotted path (`{{ user.name }}`)
//! to reach into JSON objects. Only substitution is performed; there are no
//! loops, conditionals or filters.
//!
//! ## Example
//!
//! ```rust
//! use rill_core::template::{ChatTemplate, FormatType, Variables};
//! use rill_core::messages::Message;
//!
//! let template = ChatTemplate::new(FormatType::FString)
//!     .with_message(Message::system("You are {persona}."))
//!     .with_placeholder("history", true)
//!     .with_message(Message::user("{question}"));
//!
//! let mut vars = Variables::new();
//! vars.insert("persona".into(), "a pirate".into());
//! vars.insert("question".into(), "Where is the treasure?".into());
//!
//! let messages = template.format(&vars).unwrap();
//! assert_eq!(messages.len(), 2);
//! assert_eq!(messages[0].content, "You are a pirate.");
//! ```

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::errors::TemplateError;
use crate::messages::Message;
use crate::settings::FormatSettings;

/// Placeholder dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    /// Python-style `{name}`.
    #[default]
    FString,
    /// Jinja2-style `{{ name }}`.
    Jinja2,
    /// Go-template-style `{{.name}}`.
    GoTemplate,
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FString => "f_string",
            Self::Jinja2 => "jinja2",
            Self::GoTemplate => "go_template",
        };
        f.write_str(name)
    }
}

/// A template variable.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    /// A plain value, rendered through its text form.
    Value(Value),
    /// A message history, expanded by [`MessagesPlaceholder`].
    Messages(Vec<Message>),
}

impl From<Value> for TemplateValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<i64> for TemplateValue {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<f64> for TemplateValue {
    fn from(value: f64) -> Self {
        Self::Value(value.into())
    }
}

impl From<bool> for TemplateValue {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

impl From<Vec<Message>> for TemplateValue {
    fn from(messages: Vec<Message>) -> Self {
        Self::Messages(messages)
    }
}

/// Variables available to a template.
pub type Variables = HashMap<String, TemplateValue>;

fn fstring_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("f-string pattern is valid")
    })
}

fn jinja_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
            .expect("jinja2 pattern is valid")
    })
}

fn go_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{-?\s*\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*-?\}\}")
            .expect("go template pattern is valid")
    })
}

/// Resolve `name` or a dotted `name.field.sub` path.
fn lookup(vars: &Variables, path: &str) -> Result<Option<String>, TemplateError> {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or_default();
    let value = match vars.get(head) {
        None => return Ok(None),
        Some(TemplateValue::Messages(_)) => {
            return Err(TemplateError::InvalidVariable {
                name: path.to_string(),
                reason: "message history can only be expanded by a messages placeholder"
                    .to_string(),
            })
        }
        Some(TemplateValue::Value(value)) => value,
    };

    let mut current = value;
    for segment in segments {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return Ok(None),
        }
    }
    Ok(Some(render_value(current)))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Substitute variables into `template` using the given dialect.
pub fn render(template: &str, vars: &Variables, dialect: FormatType) -> Result<String, TemplateError> {
    let mut error = None;
    let rendered = match dialect {
        FormatType::FString => fstring_pattern().replace_all(template, |caps: &Captures<'_>| {
            match caps.get(1) {
                None if &caps[0] == "{{" => "{".to_string(),
                None => "}".to_string(),
                Some(name) => match lookup(vars, name.as_str()) {
                    Ok(Some(value)) => value,
                    Ok(None) => caps[0].to_string(),
                    Err(err) => {
                        error.get_or_insert(err);
                        String::new()
                    }
                },
            }
        }),
        FormatType::Jinja2 => jinja_pattern().replace_all(template, |caps: &Captures<'_>| {
            match lookup(vars, &caps[1]) {
                Ok(value) => value.unwrap_or_default(),
                Err(err) => {
                    error.get_or_insert(err);
                    String::new()
                }
            }
        }),
        FormatType::GoTemplate => go_pattern().replace_all(template, |caps: &Captures<'_>| {
            match lookup(vars, &caps[1]) {
                Ok(Some(value)) => value,
                Ok(None) => {
                    error.get_or_insert(TemplateError::MissingVariable {
                        name: caps[1].to_string(),
                    });
                    String::new()
                }
                Err(err) => {
                    error.get_or_insert(err);
                    String::new()
                }
            }
        }),
    };
    match error {
        Some(err) => Err(err),
        None => Ok(rendered.into_owned()),
    }
}

fn render_in_place(
    text: &mut String,
    vars: &Variables,
    dialect: FormatType,
) -> Result<(), TemplateError> {
    if !text.is_empty() {
        *text = render(text, vars, dialect)?;
    }
    Ok(())
}

/// Render an optional string only when it is present and non-empty.
fn render_optional(
    text: &mut Option<String>,
    vars: &Variables,
    dialect: FormatType,
) -> Result<(), TemplateError> {
    match text {
        Some(inner) => render_in_place(inner, vars, dialect),
        None => Ok(()),
    }
}

/// Something that renders to a sequence of messages.
pub trait MessagesTemplate: Send + Sync {
    /// Render with the given variables.
    fn format(&self, vars: &Variables, dialect: FormatType) -> Result<Vec<Message>, TemplateError>;
}

impl MessagesTemplate for Message {
    /// Renders `content`, legacy part text and URLs, and user-input part text,
    /// URLs and payloads. Other fields are copied unchanged.
    fn format(&self, vars: &Variables, dialect: FormatType) -> Result<Vec<Message>, TemplateError> {
        let mut out = self.clone();
        render_in_place(&mut out.content, vars, dialect)?;

        for part in &mut out.multi_content {
            render_in_place(&mut part.text, vars, dialect)?;
            if let Some(image) = part.image_url.as_mut() {
                render_in_place(&mut image.url, vars, dialect)?;
            }
            for media in [&mut part.audio_url, &mut part.video_url, &mut part.file_url] {
                if let Some(media) = media.as_mut() {
                    render_in_place(&mut media.url, vars, dialect)?;
                }
            }
        }

        for part in &mut out.user_input_multi_content {
            render_in_place(&mut part.text, vars, dialect)?;
            if let Some(media) = part.media_mut() {
                render_optional(&mut media.url, vars, dialect)?;
                render_optional(&mut media.base64_data, vars, dialect)?;
            }
        }

        Ok(vec![out])
    }
}

/// Expands to the message history stored under `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesPlaceholder {
    /// Variable name holding the history.
    pub key: String,
    /// When true a missing variable expands to nothing instead of failing.
    #[serde(default)]
    pub optional: bool,
}

impl MessagesPlaceholder {
    /// Create a new placeholder.
    pub fn new(key: impl Into<String>, optional: bool) -> Self {
        Self {
            key: key.into(),
            optional,
        }
    }
}

impl MessagesTemplate for MessagesPlaceholder {
    fn format(&self, vars: &Variables, _dialect: FormatType) -> Result<Vec<Message>, TemplateError> {
        match vars.get(&self.key) {
            Some(TemplateValue::Messages(messages)) => Ok(messages.clone()),
            Some(TemplateValue::Value(value @ Value::Array(_))) => {
                serde_json::from_value(value.clone()).map_err(|err| TemplateError::InvalidVariable {
                    name: self.key.clone(),
                    reason: err.to_string(),
                })
            }
            Some(TemplateValue::Value(_)) => Err(TemplateError::InvalidVariable {
                name: self.key.clone(),
                reason: "expected a list of messages".to_string(),
            }),
            None if self.optional => Ok(Vec::new()),
            None => Err(TemplateError::MissingMessages {
                key: self.key.clone(),
            }),
        }
    }
}

/// An ordered list of templates rendered with one dialect.
pub struct ChatTemplate {
    dialect: FormatType,
    templates: Vec<Box<dyn MessagesTemplate>>,
}

impl ChatTemplate {
    /// Create an empty template.
    #[must_use]
    pub fn new(dialect: FormatType) -> Self {
        Self {
            dialect,
            templates: Vec::new(),
        }
    }

    /// Create an empty template from settings.
    #[must_use]
    pub fn from_settings(settings: &FormatSettings) -> Self {
        Self::new(settings.dialect)
    }

    /// Append a message template.
    #[must_use]
    pub fn with_message(self, message: Message) -> Self {
        self.with_template(message)
    }

    /// Append a history placeholder.
    #[must_use]
    pub fn with_placeholder(self, key: impl Into<String>, optional: bool) -> Self {
        self.with_template(MessagesPlaceholder::new(key, optional))
    }

    /// Append any template.
    #[must_use]
    pub fn with_template(mut self, template: impl MessagesTemplate + 'static) -> Self {
        self.templates.push(Box::new(template));
        self
    }

    /// The dialect in use.
    #[must_use]
    pub fn dialect(&self) -> FormatType {
        self.dialect
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if there are no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Render all templates in order.
    pub fn format(&self, vars: &Variables) -> Result<Vec<Message>, TemplateError> {
        self.render_with(vars, self.dialect)
    }

    fn render_with(&self, vars: &Variables, dialect: FormatType) -> Result<Vec<Message>, TemplateError> {
        let mut out = Vec::new();
        for template in &self.templates {
            out.extend(template.format(vars, dialect)?);
        }
        Ok(out)
    }
}

/// Nested chat templates follow the dialect of the enclosing one.
impl MessagesTemplate for ChatTemplate {
    fn format(&self, vars: &Variables, dialect: FormatType) -> Result<Vec<Message>, TemplateError> {
        self.render_with(vars, dialect)
    }
}

impl fmt::Debug for ChatTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTemplate")
            .field("dialect", &self.dialect)
            .field("templates", &self.templates.len())
            .finish()
    }
}
