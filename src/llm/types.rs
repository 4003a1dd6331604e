//! Tool definition types handed to the host runtime
//!
//! These serialize to the custom-tool shape the Anthropic Messages API expects:
//! a name, a description and a JSON schema describing the input object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON schema for a tool's input object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// A tool implemented client-side and described to the model by schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: ToolInputSchema,
    /// Always `"custom"` when set
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
}

/// Definition of a tool as registered with the host runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolDefinition {
    Custom(CustomTool),
}

impl ToolDefinition {
    /// Name the model uses to call the tool
    pub fn name(&self) -> &str {
        match self {
            ToolDefinition::Custom(custom) => &custom.name,
        }
    }
}

/// Build a custom tool definition from an object schema's properties
pub fn define_tool(
    name: impl Into<String>,
    description: impl Into<String>,
    properties: Value,
    required: Vec<String>,
) -> ToolDefinition {
    ToolDefinition::Custom(CustomTool {
        name: name.into(),
        description: Some(description.into()),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(required),
        },
        tool_type: Some("custom".to_string()),
    })
}
