//! Assistant service abstraction
//!
//! The job application tool talks to the remote assistant only through this
//! trait, so it can be driven by the real HTTP client or a scripted fake.

use anyhow::Result;
use async_trait::async_trait;

use super::assistant::{Run, Thread, ThreadMessage};

/// Operations on the threads/runs API used by the job application tool
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    /// Open a new, empty thread
    async fn create_thread(&self) -> Result<Thread>;

    /// Post a user message to a thread
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<()>;

    /// Start a run of `assistant_id` against the thread's messages
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    /// Fetch the current state of a run
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// List the thread's messages, newest first
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>>;
}
