//! Tool trait definition
//!
//! Everything the host runtime needs to register and call a tool.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::ToolDefinition;

/// Content type for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolResultData {
    /// Text content
    Text(String),
    /// Binary artifact (base64 data, media type, and description)
    Document {
        data: String,
        media_type: String,
        description: String,
    },
}

/// Result of executing a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The content of the tool result
    pub content: ToolResultData,
    /// Whether the tool execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result with text content
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            content: ToolResultData::Text(output.into()),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: ToolResultData::Text(message.into()),
            is_error: true,
        }
    }

    /// Create a successful document result from already-encoded data
    pub fn document(
        data_base64: impl Into<String>,
        media_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            content: ToolResultData::Document {
                data: data_base64.into(),
                media_type: media_type.into(),
                description: description.into(),
            },
            is_error: false,
        }
    }

    /// Human-readable message: the text, or a document's description
    pub fn output(&self) -> &str {
        match &self.content {
            ToolResultData::Text(text) => text,
            ToolResultData::Document { description, .. } => description,
        }
    }
}

/// Information about a tool for permission prompts
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool
    pub name: String,
    /// Human-readable description of what this invocation will do
    pub action_description: String,
    /// Additional details about the action
    pub details: Option<String>,
}

/// Trait for tools the host runtime can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of this tool
    fn name(&self) -> &str;

    /// Get a description of this tool
    fn description(&self) -> &str;

    /// Get the tool definition to register with the model
    fn definition(&self) -> ToolDefinition;

    /// Get information about what this tool invocation will do
    ///
    /// This is used to display permission prompts to the user.
    fn get_info(&self, input: &Value) -> ToolInfo;

    /// Execute the tool with the given input
    ///
    /// The input is a JSON value that matches the tool's input schema.
    async fn execute(&self, input: &Value) -> Result<ToolResult>;

    /// Check if this tool requires permission before execution
    ///
    /// Default is true - tools should generally require permission.
    fn requires_permission(&self) -> bool {
        true
    }
}
