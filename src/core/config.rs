//! Configuration for the job application tool
//!
//! Everything can be set explicitly with the `with_*` builders or loaded from
//! the environment:
//!
//! - `OPENAI_API_KEY` (not validated here; a missing key fails at the first request)
//! - `OPENAI_BASE_URL` (optional, defaults to the OpenAI API)
//! - `JOB_APPLICATION_ASSISTANT_ID` (optional)
//! - `JOB_APPLICATION_OUTPUT_DIR` (optional, defaults to `/tmp/job_applications`)
//! - `JOB_APPLICATION_POLL_INTERVAL_MS` (optional, first delay between status checks)
//! - `JOB_APPLICATION_POLL_TIMEOUT_SECS` (optional, overall deadline for a run)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default OpenAI API base URL
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
/// Assistant configured with the resume/cover letter instructions
pub const DEFAULT_ASSISTANT_ID: &str = "asst_LeF46BdHOuVGcSG8U900tv4C";
/// Where generated PDFs are written
pub const DEFAULT_OUTPUT_DIR: &str = "/tmp/job_applications";
/// Per-request HTTP timeout in milliseconds (60 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60000;

/// How to wait for an assistant run to reach a terminal status.
///
/// The delay between status checks starts at `initial_interval` and is
/// multiplied by `multiplier` after every check, capped at `max_interval`.
/// Once `deadline` has elapsed since the run was created the wait gives up.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            multiplier: 2.0,
            deadline: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    /// Constant delay between checks, no backoff
    pub fn fixed(interval: Duration, deadline: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            deadline,
        }
    }

    /// Delay to use after waiting `current`
    ///
    /// Never exceeds `max_interval`; a product too large for `Duration` jumps
    /// straight to the cap.
    pub fn next_interval(&self, current: Duration) -> Duration {
        let scaled = current.as_secs_f64() * self.multiplier.max(1.0);
        Duration::try_from_secs_f64(scaled)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }
}

/// Settings for [`JobApplicationTool`](crate::tools::job_application::JobApplicationTool)
#[derive(Debug, Clone)]
pub struct JobApplicationConfig {
    /// Bearer token for the assistant service
    pub api_key: Option<String>,
    /// Base URL of the assistant service
    pub api_base: String,
    /// Assistant every run is bound to
    pub assistant_id: String,
    /// Directory that receives the generated PDFs
    pub output_dir: PathBuf,
    /// Run polling behaviour
    pub poll: PollPolicy,
    /// Timeout for each individual HTTP request
    pub request_timeout: Duration,
}

impl Default for JobApplicationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            assistant_id: DEFAULT_ASSISTANT_ID.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            poll: PollPolicy::default(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl JobApplicationConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        tracing::info!("Loading job application config from environment");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.api_key = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty());
        if config.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; assistant requests will fail to authenticate");
        }

        if let Some(base) = lookup("OPENAI_BASE_URL") {
            tracing::info!("Using custom base URL: {}", base);
            config.api_base = base;
        }

        if let Some(assistant_id) = lookup("JOB_APPLICATION_ASSISTANT_ID") {
            config.assistant_id = assistant_id;
        }

        if let Some(dir) = lookup("JOB_APPLICATION_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        if let Some(ms) = lookup("JOB_APPLICATION_POLL_INTERVAL_MS").and_then(|s| s.parse().ok()) {
            config.poll.initial_interval = Duration::from_millis(ms);
        }

        if let Some(secs) = lookup("JOB_APPLICATION_POLL_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.poll.deadline = Duration::from_secs(secs);
        }

        tracing::info!("Assistant: {}", config.assistant_id);
        tracing::info!("Output directory: {}", config.output_dir.display());

        config
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the assistant id
    pub fn with_assistant_id(mut self, assistant_id: impl Into<String>) -> Self {
        self.assistant_id = assistant_id.into();
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the polling policy
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
