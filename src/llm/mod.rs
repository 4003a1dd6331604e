pub mod assistant;
pub mod auth;
pub mod openai;
pub mod provider;
pub mod types;

pub use assistant::{MessageContent, Run, RunError, RunStatus, Thread, ThreadMessage};
pub use auth::AuthConfig;
pub use openai::OpenAiAssistantsClient;
pub use provider::AssistantsApi;
pub use types::{define_tool, CustomTool, ToolDefinition, ToolInputSchema};
