//! Error type for the job application tool

use thiserror::Error;

/// Everything that can go wrong while handling a job application action.
///
/// The host runtime sees all of these as a single tool error carrying the
/// formatted message; the variants exist so callers and tests can tell them apart.
#[derive(Debug, Error)]
pub enum JobToolError {
    /// Required input was missing or empty
    #[error("{0}")]
    InvalidInput(String),

    /// The action tag is not one of the known actions
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A generation action was requested before any job description was saved
    #[error("{0}")]
    PreconditionFailed(String),

    /// The assistant run reached a terminal status other than `completed`
    #[error("Assistant run failed with status: {status}")]
    RemoteRunFailed { status: String },

    /// Network, authentication or API failure talking to the assistant service
    #[error("Assistant service error: {0}")]
    RemoteService(String),

    /// PDF layout or artifact file I/O failed
    #[error("Failed to render document: {0}")]
    Render(String),

    /// The run did not reach a terminal status before the polling deadline
    #[error("Assistant run {run_id} did not finish within {elapsed_secs}s (last status: {status})")]
    Timeout {
        run_id: String,
        status: String,
        elapsed_secs: u64,
    },

    /// The caller cancelled the generation; `stage` names the step it was in
    #[error("Generation cancelled while {stage}")]
    Cancelled { stage: String },
}

impl JobToolError {
    /// Wrap an error from the remote client
    pub fn remote(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on a single line
        JobToolError::RemoteService(format!("{:#}", err))
    }
}

impl From<std::io::Error> for JobToolError {
    fn from(err: std::io::Error) -> Self {
        JobToolError::Render(err.to_string())
    }
}
