//! Tool descriptions and invocation arguments.

use schemars::generate::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Describes a tool to the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Unique snake_case name.
    pub name: String,
    /// What the tool does.
    #[serde(default)]
    pub description: String,
    /// JSON Schema of the arguments object.
    #[serde(default = "empty_object_schema")]
    pub parameters: JsonValue,
}

fn empty_object_schema() -> JsonValue {
    serde_json::json!({"type": "object", "properties": {}})
}

impl ToolInfo {
    /// Create a tool description with an empty parameter schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: empty_object_schema(),
        }
    }

    /// Create a tool description whose parameter schema is inferred from `T`.
    ///
    /// Subschemas are inlined and the `$schema` key is dropped, so the result
    /// can be sent to a model as-is.
    pub fn infer<T: JsonSchema>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        let schema = SchemaSettings::draft2020_12()
            .with(|settings| settings.inline_subschemas = true)
            .into_generator()
            .into_root_schema_for::<T>();
        let mut parameters = serde_json::to_value(schema)?;
        if let Some(object) = parameters.as_object_mut() {
            object.remove("$schema");
        }
        Ok(Self::new(name, description).with_parameters(parameters))
    }

    /// Set the parameter schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: impl Into<JsonValue>) -> Self {
        self.parameters = parameters.into();
        self
    }

    /// CamelCase type name derived from the tool name.
    #[must_use]
    pub fn tool_type(&self) -> String {
        snake_to_camel(&self.name)
    }
}

/// Arguments of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolArgument {
    /// Arguments as a JSON document.
    pub text: String,
}

impl ToolArgument {
    /// Create from a JSON string.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for ToolArgument {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for ToolArgument {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Convert `snake_case` to `CamelCase`.
///
/// Each `_`-separated segment gets an upper-case first character and a
/// lower-case remainder; empty segments are dropped.
#[must_use]
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_') {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("search_user", "SearchUser")]
    #[case("get_WEATHER_now", "GetWeatherNow")]
    #[case("__leading", "Leading")]
    #[case("single", "Single")]
    fn test_snake_to_camel(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(snake_to_camel(input), expected);
    }

    #[test]
    fn test_tool_info_serde() {
        let info = ToolInfo::new("search_user", "search user info").with_parameters(serde_json::json!({
            "type": "object",
            "properties": {"name": {"type": "string", "description": "user name"}},
        }));
        assert_eq!(info.tool_type(), "SearchUser");

        let back: ToolInfo = serde_json::from_value(serde_json::to_value(&info).unwrap()).unwrap();
        assert_eq!(back, info);

        let bare: ToolInfo = serde_json::from_str(r#"{"name":"noop"}"#).unwrap();
        assert_eq!(bare.parameters["type"], "object");
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Unit {
        symbol: String,
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Forecast {
        /// City to look up.
        city: String,
        days: Option<u8>,
        unit: Unit,
    }

    #[test]
    fn test_infer_parameters() {
        let info = ToolInfo::infer::<Forecast>("get_forecast", "weather").unwrap();
        assert_eq!(info.name, "get_forecast");

        let params = &info.parameters;
        assert_eq!(params["type"], "object");
        assert!(params.get("$schema").is_none());
        assert_eq!(params["properties"]["city"]["type"], "string");
        assert_eq!(params["properties"]["city"]["description"], "City to look up.");
        assert_eq!(params["properties"]["unit"]["type"], "object");
        assert_eq!(params["required"], serde_json::json!(["city", "unit"]));
    }
}
