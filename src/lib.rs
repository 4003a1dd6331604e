//! Job application tool for LLM agent runtimes
//!
//! Stores a job description and asks an OpenAI assistant to write a resume or
//! cover letter for it. The generated text is rendered to a PDF and handed back
//! to the host runtime as a base64-encoded document.
//!
//! ```ignore
//! let config = JobApplicationConfig::from_env();
//! let tool = JobApplicationTool::from_config(&config)?;
//!
//! tool.save_description(Some("Senior Rust engineer, distributed storage team..."))?;
//! let document = tool.generate_document(DocumentKind::Resume).await?;
//! println!("{}", document.path.display());
//! ```

pub mod core;
pub mod llm;
pub mod logging;
pub mod tools;

pub use crate::core::{JobApplicationConfig, JobToolError, JobToolResult, PollPolicy};
pub use tools::job_application::{DocumentKind, GeneratedDocument, JobAction, JobApplicationTool};
pub use tools::{Tool, ToolResult};
