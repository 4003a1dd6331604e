//! Tools exposed to the host agent runtime
//!
//! This module provides the Tool trait and the job application tool.

pub mod job_application;
mod tool;

pub use job_application::JobApplicationTool;
pub use tool::{Tool, ToolInfo, ToolResult, ToolResultData};
