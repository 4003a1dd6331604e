//! OpenAI Assistants API client
//!
//! A direct HTTP client for the beta threads/runs endpoints, implementing
//! [`AssistantsApi`].
//!
//! # Authentication
//!
//! Uses an OpenAI API key sent as a Bearer token. A missing key is not rejected
//! here: requests go out without an `Authorization` header and the service
//! answers with an authentication error.
//!
//! ```ignore
//! let client = OpenAiAssistantsClient::new(AuthConfig::new("sk-..."))?;
//! let thread = client.create_thread().await?;
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::assistant::{
    CreateMessageRequest, CreateRunRequest, ListResponse, Run, Thread, ThreadMessage,
};
use super::auth::AuthConfig;
use super::provider::AssistantsApi;
use crate::core::config::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT_MS};

/// Header opting in to the v2 Assistants API
const ASSISTANTS_BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");
/// Messages fetched after a run completes; the newest ones are all we need
const MESSAGE_PAGE_SIZE: u32 = 20;

/// HTTP client for the OpenAI Assistants API
pub struct OpenAiAssistantsClient {
    client: Client,
    auth: AuthConfig,
    api_base: String,
}

impl OpenAiAssistantsClient {
    /// Create a client with the default request timeout
    pub fn new(auth: AuthConfig) -> Result<Self> {
        Self::with_timeout(auth, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Create a client with a specific per-request timeout
    pub fn with_timeout(auth: AuthConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let api_base = auth
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            client,
            auth,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ASSISTANTS_BETA_HEADER.0, ASSISTANTS_BETA_HEADER.1);
        match self.auth.api_key {
            Some(ref key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request_json =
            serde_json::to_string(body).context("Failed to serialize assistant request")?;
        tracing::debug!("[Assistants] POST {} {}", url, request_json);

        let request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(request_json);

        self.send(self.authorize(request), &url).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("[Assistants] GET {}", url);

        let request = self.client.get(&url).query(query);
        self.send(self.authorize(request), &url).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read assistant response body")?;

        tracing::debug!("[Assistants] Response status: {}", status);
        tracing::debug!("[Assistants] Response body: {}", response_text);

        if !status.is_success() {
            tracing::error!("[Assistants] API error: {} - {}", status, response_text);
            anyhow::bail!("OpenAI API error ({}): {}", status, response_text);
        }

        serde_json::from_str(&response_text).context("Failed to parse assistant response")
    }
}

#[async_trait]
impl AssistantsApi for OpenAiAssistantsClient {
    async fn create_thread(&self) -> Result<Thread> {
        let thread: Thread = self
            .post("threads", &serde_json::json!({}))
            .await
            .context("Failed to create thread")?;
        tracing::info!("[Assistants] Created thread {}", thread.id);
        Ok(thread)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<()> {
        let body = CreateMessageRequest {
            role: "user",
            content,
        };
        let _: ThreadMessage = self
            .post(&format!("threads/{}/messages", thread_id), &body)
            .await
            .context("Failed to post message")?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let body = CreateRunRequest { assistant_id };
        let run: Run = self
            .post(&format!("threads/{}/runs", thread_id), &body)
            .await
            .context("Failed to create run")?;
        tracing::info!("[Assistants] Started run {} ({})", run.id, run.status);
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get(&format!("threads/{}/runs/{}", thread_id, run_id), &[])
            .await
            .context("Failed to retrieve run")
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let query = [
            ("order", "desc".to_string()),
            ("limit", MESSAGE_PAGE_SIZE.to_string()),
        ];
        let list: ListResponse<ThreadMessage> = self
            .get(&format!("threads/{}/messages", thread_id), &query)
            .await
            .context("Failed to list messages")?;
        Ok(list.data)
    }
}
