//! Job application tool
//!
//! Keeps the last saved job description and asks an OpenAI assistant to turn it
//! into a resume or cover letter. The assistant's reply is rendered to a PDF,
//! written under the output directory and returned base64-encoded.
//!
//! A generation call runs: create thread → post job description → start run →
//! poll until terminal → read the newest assistant message → render → store.

pub mod poll;
pub mod render;
pub mod storage;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;

use super::tool::{Tool, ToolInfo, ToolResult};
use crate::core::{JobApplicationConfig, JobToolError, JobToolResult, PollPolicy};
use crate::llm::{define_tool, AssistantsApi, AuthConfig, OpenAiAssistantsClient, ThreadMessage, ToolDefinition};
use poll::cancellable;
use storage::ArtifactStore;

/// Name the tool is registered under
pub const TOOL_NAME: &str = "job_application";
/// Media type of generated documents
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Actions the tool accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    SaveJd,
    GenerateResume,
    GenerateCoverLetter,
}

impl JobAction {
    pub const ALL: [JobAction; 3] = [
        JobAction::SaveJd,
        JobAction::GenerateResume,
        JobAction::GenerateCoverLetter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::SaveJd => "save_jd",
            JobAction::GenerateResume => "generate_resume",
            JobAction::GenerateCoverLetter => "generate_cover_letter",
        }
    }

    /// Document produced by this action, if it generates one
    pub fn document_kind(&self) -> Option<DocumentKind> {
        match self {
            JobAction::SaveJd => None,
            JobAction::GenerateResume => Some(DocumentKind::Resume),
            JobAction::GenerateCoverLetter => Some(DocumentKind::CoverLetter),
        }
    }
}

impl FromStr for JobAction {
    type Err = JobToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| JobToolError::InvalidAction(s.to_string()))
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of document to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Name used in prompts and messages
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover letter",
        }
    }

    pub fn action(&self) -> JobAction {
        match self {
            DocumentKind::Resume => JobAction::GenerateResume,
            DocumentKind::CoverLetter => JobAction::GenerateCoverLetter,
        }
    }
}

/// Job description plus the document wanted for it
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub job_description: String,
    pub kind: DocumentKind,
}

impl GenerationRequest {
    /// The single user message posted to the thread
    pub fn prompt(&self) -> String {
        format!(
            "Job Description:\n{}\n\nPlease generate a {} for this position.",
            self.job_description,
            self.kind.label()
        )
    }
}

/// A generated document, rendered and stored
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    /// Text the assistant produced
    pub text: String,
    /// Where the PDF was written
    pub path: PathBuf,
    /// PDF size in bytes
    pub size: usize,
    /// PDF bytes, base64 (standard alphabet, padded)
    pub base64: String,
    pub page_count: usize,
}

impl GeneratedDocument {
    pub fn media_type(&self) -> &'static str {
        PDF_MEDIA_TYPE
    }

    /// e.g. "Generated cover letter as PDF"
    pub fn message(&self) -> String {
        format!("Generated {} as PDF", self.kind.label())
    }
}

/// What a dispatched action produced
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Saved { message: String },
    Generated(GeneratedDocument),
}

/// Input for the job application tool
#[derive(Debug, Deserialize)]
struct JobApplicationInput {
    /// One of `save_jd`, `generate_resume`, `generate_cover_letter`
    action: String,
    /// Job description (required for `save_jd`)
    text: Option<String>,
}

/// Tool that saves a job description and generates application documents for it
pub struct JobApplicationTool {
    api: Arc<dyn AssistantsApi>,
    assistant_id: String,
    store: ArtifactStore,
    poll: PollPolicy,
    /// Last saved job description
    stored_jd: RwLock<Option<String>>,
    /// Fires to abort every in-flight generation
    shutdown: CancellationToken,
}

impl JobApplicationTool {
    /// Create a tool around an assistant client, with default storage and polling
    pub fn new(api: Arc<dyn AssistantsApi>, assistant_id: impl Into<String>) -> Self {
        let defaults = JobApplicationConfig::default();
        Self {
            api,
            assistant_id: assistant_id.into(),
            store: ArtifactStore::new(defaults.output_dir),
            poll: defaults.poll,
            stored_jd: RwLock::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    /// Create a tool talking to the OpenAI API as described by `config`
    pub fn from_config(config: &JobApplicationConfig) -> Result<Self> {
        let auth = AuthConfig {
            api_key: config.api_key.clone(),
            base_url: Some(config.api_base.clone()),
        };
        let client = OpenAiAssistantsClient::with_timeout(auth, config.request_timeout)?;

        Ok(Self::new(Arc::new(client), config.assistant_id.clone())
            .with_output_dir(config.output_dir.clone())
            .with_poll_policy(config.poll.clone()))
    }

    /// Set the directory generated PDFs are written to
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.store = ArtifactStore::new(output_dir);
        self
    }

    /// Set how runs are polled
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Use an externally owned token to abort generations
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Token that aborts every in-flight generation when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn output_dir(&self) -> &std::path::Path {
        self.store.output_dir()
    }

    /// The currently saved job description
    pub fn stored_description(&self) -> Option<String> {
        self.stored_jd
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Save `text` as the job description, replacing any earlier one
    pub fn save_description(&self, text: Option<&str>) -> JobToolResult<String> {
        let text = match text {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                return Err(JobToolError::InvalidInput(
                    "Job description text is required".to_string(),
                ))
            }
        };

        *self.stored_jd.write().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        tracing::info!("Saved job description ({} chars)", text.len());

        Ok("Job description saved successfully".to_string())
    }

    /// Snapshot the saved description into a request
    fn generation_request(&self, kind: DocumentKind) -> JobToolResult<GenerationRequest> {
        let job_description = self.stored_description().ok_or_else(|| {
            JobToolError::PreconditionFailed(
                "No job description stored. Please save a job description first.".to_string(),
            )
        })?;

        Ok(GenerationRequest {
            job_description,
            kind,
        })
    }

    /// Generate a document for the saved job description
    ///
    /// Aborted only through the tool's own cancellation token. Cancellation is
    /// honoured at every remote call, not just while polling.
    pub async fn generate_document(&self, kind: DocumentKind) -> JobToolResult<GeneratedDocument> {
        self.generate_document_with_cancel(kind, self.shutdown.child_token())
            .await
    }

    /// Generate a document, giving up when `cancel` fires
    pub async fn generate_document_with_cancel(
        &self,
        kind: DocumentKind,
        cancel: CancellationToken,
    ) -> JobToolResult<GeneratedDocument> {
        let request = self.generation_request(kind)?;
        tracing::info!("Generating {}", kind.label());

        let text = self.run_assistant(&request, &cancel).await?;

        let rendered = render::render_text_pdf(kind.label(), &text)?;
        let artifact = self
            .store
            .store_pdf(kind.action().as_str(), &rendered.bytes)
            .await?;

        Ok(GeneratedDocument {
            kind,
            text,
            path: artifact.path,
            size: artifact.size,
            base64: artifact.base64,
            page_count: rendered.page_count,
        })
    }

    /// Run the assistant on a fresh thread and return its reply text
    async fn run_assistant(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> JobToolResult<String> {
        let api = self.api.as_ref();

        let thread = cancellable(cancel, "creating thread", api.create_thread()).await?;
        cancellable(
            cancel,
            "posting job description",
            api.add_user_message(&thread.id, &request.prompt()),
        )
        .await?;
        let run = cancellable(
            cancel,
            "starting assistant run",
            api.create_run(&thread.id, &self.assistant_id),
        )
        .await?;
        tracing::debug!("Thread {} run {} created ({})", thread.id, run.id, run.status);

        let run = poll::wait_for_run(api, &thread.id, run, &self.poll, cancel).await?;

        if run.status != crate::llm::RunStatus::Completed {
            if let Some(ref error) = run.last_error {
                tracing::error!("Run {} failed: {} - {}", run.id, error.code, error.message);
            }
            return Err(JobToolError::RemoteRunFailed {
                status: run.status.to_string(),
            });
        }

        let messages =
            cancellable(cancel, "fetching generated text", api.list_messages(&thread.id)).await?;

        // Only the newest assistant message counts; older drafts are never a fallback
        messages
            .iter()
            .find(|message| message.is_assistant())
            .and_then(ThreadMessage::first_text)
            .map(str::to_string)
            .ok_or_else(|| {
                JobToolError::RemoteService(format!(
                    "Assistant returned no text on thread {}",
                    thread.id
                ))
            })
    }

    /// Route an action tag to the matching operation
    pub async fn dispatch(&self, action: &str, text: Option<&str>) -> JobToolResult<ActionOutcome> {
        let action: JobAction = action.parse()?;
        tracing::info!("job_application action: {}", action);

        match action.document_kind() {
            None => Ok(ActionOutcome::Saved {
                message: self.save_description(text)?,
            }),
            Some(kind) => Ok(ActionOutcome::Generated(self.generate_document(kind).await?)),
        }
    }
}

#[async_trait]
impl Tool for JobApplicationTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Handle job applications: save a job description, then generate a tailored resume or cover letter for it as a PDF."
    }

    fn definition(&self) -> ToolDefinition {
        define_tool(
            TOOL_NAME,
            self.description(),
            json!({
                "action": {
                    "type": "string",
                    "enum": JobAction::ALL.iter().map(JobAction::as_str).collect::<Vec<_>>(),
                    "description": "The action to perform"
                },
                "text": {
                    "type": "string",
                    "description": "The text content (required for save_jd action)"
                }
            }),
            vec!["action".to_string()],
        )
    }

    fn get_info(&self, input: &Value) -> ToolInfo {
        let action = input
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown action>");

        let (action_description, details) = match action.parse::<JobAction>() {
            Ok(JobAction::SaveJd) => {
                let len = input
                    .get("text")
                    .and_then(|v| v.as_str())
                    .map(str::len)
                    .unwrap_or(0);
                (format!("Save job description ({} chars)", len), None)
            }
            Ok(generate) => {
                let label = generate.document_kind().map(|k| k.label()).unwrap_or("document");
                (
                    format!("Generate {} PDF", label),
                    Some(format!("Output directory: {}", self.output_dir().display())),
                )
            }
            Err(_) => (format!("Run job application action: {}", action), None),
        };

        ToolInfo {
            name: TOOL_NAME.to_string(),
            action_description,
            details,
        }
    }

    async fn execute(&self, input: &Value) -> Result<ToolResult> {
        let job_input: JobApplicationInput = serde_json::from_value(input.clone())
            .map_err(|e| anyhow::anyhow!("Invalid job application input: {}", e))?;

        match self.dispatch(&job_input.action, job_input.text.as_deref()).await {
            Ok(ActionOutcome::Saved { message }) => Ok(ToolResult::success(message)),
            Ok(ActionOutcome::Generated(document)) => Ok(ToolResult::document(
                document.base64.clone(),
                document.media_type(),
                document.message(),
            )),
            Err(e) => {
                tracing::warn!("job_application {} failed: {}", job_input.action, e);
                Ok(ToolResult::error(e.to_string()))
            }
        }
    }

    fn requires_permission(&self) -> bool {
        true // Generation calls a paid API and writes files
    }
}
