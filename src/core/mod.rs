//! Core types shared across the crate: errors and configuration.

pub mod config;
pub mod error;

pub use config::{JobApplicationConfig, PollPolicy};
pub use error::JobToolError;

/// Result type used by the job application tool
pub type JobToolResult<T> = Result<T, JobToolError>;
