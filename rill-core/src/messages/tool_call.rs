//! Tool calls requested by the model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Function invocation carried by a [`ToolCall`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call.
    #[serde(default)]
    pub name: String,
    /// Arguments as a JSON literal; grows chunk by chunk while streaming.
    #[serde(default)]
    pub arguments: String,
}

/// A tool call, or one fragment of a streamed tool call.
///
/// Fragments of the same call share an `index`. A call without an index is
/// already complete and is never merged with another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Fragment correlation index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Call ID.
    #[serde(default)]
    pub id: String,
    /// Call type, usually `"function"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// The function invocation.
    #[serde(default)]
    pub function: FunctionCall,
    /// Provider-specific metadata.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ToolCall {
    /// A complete function call.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            index: None,
            id: id.into(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
            extra: Map::new(),
        }
    }

    /// A fragment carrying only an arguments delta.
    pub fn fragment(index: usize, arguments: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            function: FunctionCall {
                name: String::new(),
                arguments: arguments.into(),
            },
            ..Default::default()
        }
    }

    /// Set the fragment index.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Parse the accumulated arguments as JSON.
    pub fn parse_arguments(&self) -> Result<Value, serde_json::Error> {
        if self.function.arguments.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&self.function.arguments)
    }
}
