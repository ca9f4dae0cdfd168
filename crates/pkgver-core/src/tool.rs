//! Tool handler contract and the protocol text-content result form.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One invocable tool.
///
/// Implementors decode the raw argument map themselves (via
/// `pkgver_core::request`) and return the raw JSON value of their result:
/// an array of descriptors for list tools, a single object for the
/// Bedrock `get`-style tools. The dispatcher renders that value into the
/// protocol's text-content form.
///
/// Cancellation is cooperative: every suspension point inside a handler
/// is an HTTP await or a cache write, so the caller cancels a request by
/// dropping the `call` future. Partial results die with it.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use pkgver_core::tool::ToolHandler;
/// use serde_json::{Value, json};
///
/// struct Echo;
///
/// #[async_trait]
/// impl ToolHandler for Echo {
///     fn name(&self) -> &'static str {
///         "echo"
///     }
///
///     fn description(&self) -> &'static str {
///         "Returns its arguments"
///     }
///
///     fn input_schema(&self) -> Value {
///         json!({"type": "object", "properties": {}})
///     }
///
///     async fn call(&self, args: Value) -> pkgver_core::error::Result<Value> {
///         Ok(args)
///     }
/// }
/// ```
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Stable tool name as registered in the catalogue.
    fn name(&self) -> &'static str;

    /// Short human-readable description for the catalogue listing.
    fn description(&self) -> &'static str;

    /// JSON schema describing the argument map. Must be object-typed and
    /// declare `items` with a concrete `type` for every array property;
    /// the dispatcher's startup check enforces this.
    fn input_schema(&self) -> Value;

    /// Executes the tool against a decoded argument map.
    async fn call(&self, args: Value) -> Result<Value>;
}

/// A single text content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Tool result in the protocol's content form: exactly one text item
/// whose body is the indented JSON rendering of the resolver output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<TextContent>,
}

impl ToolResponse {
    /// Wraps a resolver result value as indented JSON text.
    pub fn from_value(value: &Value) -> Result<Self> {
        let text = serde_json::to_string_pretty(value)?;
        Ok(Self {
            content: vec![TextContent {
                content_type: "text".into(),
                text,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_wraps_pretty_json() {
        let value = json!([{"name": "react", "latestVersion": "18.2.0"}]);
        let response = ToolResponse::from_value(&value).unwrap();

        assert_eq!(response.content.len(), 1);
        assert_eq!(response.content[0].content_type, "text");
        // Indented rendering round-trips to the same value
        let parsed: Value = serde_json::from_str(&response.content[0].text).unwrap();
        assert_eq!(parsed, value);
        assert!(response.content[0].text.contains('\n'));
    }

    #[test]
    fn test_response_serialization_shape() {
        let response = ToolResponse::from_value(&json!({"ok": true})).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert!(json["content"][0]["text"].is_string());
    }
}
