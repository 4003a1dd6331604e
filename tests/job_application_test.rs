// Tests for the job application tool against a scripted assistant service.
//
// No network access is needed; the fake replays a fixed sequence of run statuses.

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use jobkit::llm::{AssistantsApi, Run, Thread, ThreadMessage};
use jobkit::tools::job_application::{ActionOutcome, DocumentKind, JobApplicationTool};
use jobkit::tools::{Tool, ToolResultData};
use jobkit::{JobToolError, PollPolicy};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const RESUME_TEXT: &str = "Jane Doe\nSenior Rust Engineer\n\nExperience\n- Built a storage engine";

/// Assistant service that replays scripted run statuses
struct ScriptedApi {
    /// Status returned by create_run, then by each retrieve_run
    statuses: Mutex<VecDeque<String>>,
    /// Messages returned by list_messages
    messages: Vec<ThreadMessage>,
    prompts: Mutex<Vec<String>>,
    threads_created: AtomicUsize,
    retrievals: AtomicUsize,
    fail_thread_creation: bool,
    /// create_thread never answers
    stall_thread_creation: bool,
}

impl ScriptedApi {
    fn new(statuses: &[&str]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().map(|s| s.to_string()).collect()),
            messages: vec![
                message("assistant", RESUME_TEXT),
                message("user", "Job Description:\n..."),
            ],
            prompts: Mutex::new(Vec::new()),
            threads_created: AtomicUsize::new(0),
            retrievals: AtomicUsize::new(0),
            fail_thread_creation: false,
            stall_thread_creation: false,
        }
    }

    fn with_messages(mut self, messages: Vec<ThreadMessage>) -> Self {
        self.messages = messages;
        self
    }

    fn failing() -> Self {
        let mut api = Self::new(&[]);
        api.fail_thread_creation = true;
        api
    }

    fn stalled() -> Self {
        let mut api = Self::new(&[]);
        api.stall_thread_creation = true;
        api
    }

    fn next_run(&self) -> Run {
        let mut statuses = self.statuses.lock().unwrap();
        // The last status repeats forever
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses.front().cloned().unwrap_or_else(|| "completed".to_string())
        };
        serde_json::from_value(json!({ "id": "run_1", "status": status })).unwrap()
    }

    fn remote_calls(&self) -> usize {
        self.threads_created.load(Ordering::SeqCst) + self.retrievals.load(Ordering::SeqCst)
    }
}

fn message(role: &str, text: &str) -> ThreadMessage {
    serde_json::from_value(json!({
        "id": format!("msg_{}", role),
        "role": role,
        "content": [ { "type": "text", "text": { "value": text, "annotations": [] } } ]
    }))
    .unwrap()
}

fn image_message(role: &str) -> ThreadMessage {
    serde_json::from_value(json!({
        "id": format!("msg_{}_image", role),
        "role": role,
        "content": [ { "type": "image_file", "image_file": { "file_id": "file_1" } } ]
    }))
    .unwrap()
}

#[async_trait]
impl AssistantsApi for ScriptedApi {
    async fn create_thread(&self) -> Result<Thread> {
        if self.stall_thread_creation {
            std::future::pending::<()>().await;
        }
        if self.fail_thread_creation {
            anyhow::bail!("OpenAI API error (401 Unauthorized): invalid api key");
        }
        let n = self.threads_created.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(json!({ "id": format!("thread_{}", n) }))?)
    }

    async fn add_user_message(&self, _thread_id: &str, content: &str) -> Result<()> {
        self.prompts.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn create_run(&self, _thread_id: &str, assistant_id: &str) -> Result<Run> {
        assert_eq!(assistant_id, "asst_test");
        Ok(self.next_run())
    }

    async fn retrieve_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run> {
        self.retrievals.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_run())
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>> {
        Ok(self.messages.clone())
    }
}

fn fast_poll() -> PollPolicy {
    PollPolicy::fixed(Duration::from_millis(1), Duration::from_secs(5))
}

fn setup(api: Arc<ScriptedApi>) -> (JobApplicationTool, TempDir) {
    let temp = TempDir::new().unwrap();
    let tool = JobApplicationTool::new(api, "asst_test")
        .with_output_dir(temp.path().join("job_applications"))
        .with_poll_policy(fast_poll());
    (tool, temp)
}

fn pdf_count(tool: &JobApplicationTool) -> usize {
    std::fs::read_dir(tool.output_dir())
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_polls_until_completed_and_returns_pdf() {
    let api = Arc::new(ScriptedApi::new(&["queued", "in_progress", "completed"]));
    let (tool, _temp) = setup(api.clone());

    tool.save_description(Some("Rust engineer for storage systems")).unwrap();
    let document = tool.generate_document(DocumentKind::Resume).await.unwrap();

    assert_eq!(api.retrievals.load(Ordering::SeqCst), 2);
    assert_eq!(document.text, RESUME_TEXT);
    assert_eq!(document.message(), "Generated resume as PDF");
    assert_eq!(document.media_type(), "application/pdf");
    assert!(!document.base64.is_empty());

    let bytes = STANDARD.decode(&document.base64).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(bytes.len(), document.size);
    assert_eq!(std::fs::read(&document.path).unwrap(), bytes);

    let name = document.path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("generate_resume_"));
    assert!(name.ends_with(".pdf"));
}

#[tokio::test]
async fn test_prompt_contains_latest_description() {
    let api = Arc::new(ScriptedApi::new(&["completed"]));
    let (tool, _temp) = setup(api.clone());

    tool.save_description(Some("first posting")).unwrap();
    tool.save_description(Some("second posting")).unwrap();
    tool.generate_document(DocumentKind::CoverLetter).await.unwrap();

    let prompts = api.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0],
        "Job Description:\nsecond posting\n\nPlease generate a cover letter for this position."
    );
}

#[tokio::test]
async fn test_failed_run_reports_status_and_writes_nothing() {
    for terminal in ["failed", "cancelled", "expired"] {
        let api = Arc::new(ScriptedApi::new(&["queued", terminal]));
        let (tool, _temp) = setup(api);

        tool.save_description(Some("Data engineer")).unwrap();
        let err = tool.generate_document(DocumentKind::Resume).await.unwrap_err();

        match err {
            JobToolError::RemoteRunFailed { status } => assert_eq!(status, terminal),
            other => panic!("expected RemoteRunFailed, got {:?}", other),
        }
        assert_eq!(pdf_count(&tool), 0);
    }
}

#[tokio::test]
async fn test_generation_without_description_makes_no_remote_call() {
    let api = Arc::new(ScriptedApi::new(&["completed"]));
    let (tool, _temp) = setup(api.clone());

    let err = tool.generate_document(DocumentKind::CoverLetter).await.unwrap_err();

    assert!(matches!(err, JobToolError::PreconditionFailed(_)));
    assert_eq!(api.remote_calls(), 0);
}

#[tokio::test]
async fn test_unknown_action_has_no_side_effects() {
    let api = Arc::new(ScriptedApi::new(&["completed"]));
    let (tool, _temp) = setup(api.clone());
    tool.save_description(Some("Platform engineer")).unwrap();

    let err = tool.dispatch("generate_portfolio", None).await.unwrap_err();

    assert!(matches!(err, JobToolError::InvalidAction(ref a) if a == "generate_portfolio"));
    assert_eq!(api.remote_calls(), 0);
    assert_eq!(pdf_count(&tool), 0);
}

#[tokio::test]
async fn test_two_generations_write_two_files() {
    let api = Arc::new(ScriptedApi::new(&["completed"]));
    let (tool, _temp) = setup(api);
    tool.save_description(Some("SRE")).unwrap();

    let first = tool.generate_document(DocumentKind::Resume).await.unwrap();
    let second = tool.generate_document(DocumentKind::Resume).await.unwrap();

    assert_ne!(first.path, second.path);
    assert_eq!(pdf_count(&tool), 2);
}

#[tokio::test]
async fn test_stuck_run_times_out() {
    let api = Arc::new(ScriptedApi::new(&["in_progress"]));
    let (tool, _temp) = setup(api.clone());
    let tool = tool.with_poll_policy(PollPolicy::fixed(
        Duration::from_millis(5),
        Duration::from_millis(50),
    ));
    tool.save_description(Some("Embedded engineer")).unwrap();

    let err = tool.generate_document(DocumentKind::Resume).await.unwrap_err();

    match err {
        JobToolError::Timeout { run_id, status, .. } => {
            assert_eq!(run_id, "run_1");
            assert_eq!(status, "in_progress");
        }
        other => panic!("expected Timeout, got {:?}", other),
    }
    assert!(api.retrievals.load(Ordering::SeqCst) >= 1);
    assert_eq!(pdf_count(&tool), 0);
}

#[tokio::test]
async fn test_cancelled_tool_makes_no_remote_call() {
    let api = Arc::new(ScriptedApi::new(&["queued"]));
    let (tool, _temp) = setup(api.clone());
    tool.save_description(Some("Compiler engineer")).unwrap();

    tool.cancellation_token().cancel();
    let err = tool.generate_document(DocumentKind::Resume).await.unwrap_err();

    assert!(matches!(err, JobToolError::Cancelled { ref stage } if stage == "creating thread"));
    assert_eq!(api.remote_calls(), 0);
}

#[tokio::test]
async fn test_cancellation_interrupts_stalled_request() {
    let api = Arc::new(ScriptedApi::stalled());
    let (tool, _temp) = setup(api);
    tool.save_description(Some("Infrastructure engineer")).unwrap();

    let token = tool.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        tool.generate_document(DocumentKind::Resume),
    )
    .await
    .expect("cancellation should end the call")
    .unwrap_err();

    assert!(matches!(err, JobToolError::Cancelled { ref stage } if stage == "creating thread"));
    assert_eq!(pdf_count(&tool), 0);
}

#[tokio::test]
async fn test_per_call_cancellation() {
    let api = Arc::new(ScriptedApi::new(&["in_progress"]));
    let (tool, _temp) = setup(api);
    tool.save_description(Some("Security engineer")).unwrap();

    let token = tokio_util::sync::CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = tool
        .generate_document_with_cancel(DocumentKind::CoverLetter, token)
        .await
        .unwrap_err();
    assert!(
        matches!(err, JobToolError::Cancelled { ref stage } if stage == "waiting for assistant run run_1")
    );
}

#[tokio::test]
async fn test_remote_errors_propagate() {
    let api = Arc::new(ScriptedApi::failing());
    let (tool, _temp) = setup(api);
    tool.save_description(Some("Backend engineer")).unwrap();

    let err = tool.generate_document(DocumentKind::Resume).await.unwrap_err();

    match err {
        JobToolError::RemoteService(message) => assert!(message.contains("401")),
        other => panic!("expected RemoteService, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reply_without_assistant_text_is_an_error() {
    let api = Arc::new(
        ScriptedApi::new(&["completed"]).with_messages(vec![message("user", "Job Description:\n...")]),
    );
    let (tool, _temp) = setup(api);
    tool.save_description(Some("QA engineer")).unwrap();

    let err = tool.generate_document(DocumentKind::Resume).await.unwrap_err();
    assert!(matches!(err, JobToolError::RemoteService(_)));
}

#[tokio::test]
async fn test_newest_assistant_message_without_text_is_an_error() {
    let api = Arc::new(ScriptedApi::new(&["completed"]).with_messages(vec![
        image_message("assistant"),
        message("assistant", "OLDER draft"),
        message("user", "Job Description:\n..."),
    ]));
    let (tool, _temp) = setup(api);
    tool.save_description(Some("Graphics engineer")).unwrap();

    let err = tool.generate_document(DocumentKind::Resume).await.unwrap_err();

    match err {
        JobToolError::RemoteService(message) => assert!(!message.contains("OLDER draft")),
        other => panic!("expected RemoteService, got {:?}", other),
    }
    assert_eq!(pdf_count(&tool), 0);
}

#[tokio::test]
async fn test_tool_execute_save_and_generate() {
    let api = Arc::new(ScriptedApi::new(&["queued", "completed"]));
    let (tool, _temp) = setup(api);

    let saved = tool
        .execute(&json!({ "action": "save_jd", "text": "Staff engineer, payments" }))
        .await
        .unwrap();
    assert!(!saved.is_error);
    assert_eq!(saved.output(), "Job description saved successfully");

    let generated = tool
        .execute(&json!({ "action": "generate_cover_letter" }))
        .await
        .unwrap();
    assert!(!generated.is_error);
    match generated.content {
        ToolResultData::Document {
            data,
            media_type,
            description,
        } => {
            assert_eq!(media_type, "application/pdf");
            assert_eq!(description, "Generated cover letter as PDF");
            assert!(STANDARD.decode(data).unwrap().starts_with(b"%PDF-"));
        }
        other => panic!("expected document, got {:?}", other),
    }
}

#[tokio::test]
async fn test_tool_execute_reports_errors_as_tool_errors() {
    let api = Arc::new(ScriptedApi::new(&["completed"]));
    let (tool, _temp) = setup(api);

    let result = tool.execute(&json!({ "action": "save_jd" })).await.unwrap();
    assert!(result.is_error);
    assert_eq!(result.output(), "Job description text is required");

    let result = tool.execute(&json!({ "action": "generate_resume" })).await.unwrap();
    assert!(result.is_error);
    assert_eq!(
        result.output(),
        "No job description stored. Please save a job description first."
    );

    let result = tool.execute(&json!({ "action": "shred" })).await.unwrap();
    assert!(result.is_error);
    assert_eq!(result.output(), "Invalid action: shred");

    assert!(tool.execute(&json!({ "text": "no action" })).await.is_err());
}

#[tokio::test]
async fn test_dispatch_routes_save() {
    let api = Arc::new(ScriptedApi::new(&["completed"]));
    let (tool, _temp) = setup(api);

    match tool.dispatch("save_jd", Some("ML engineer")).await.unwrap() {
        ActionOutcome::Saved { message } => assert_eq!(message, "Job description saved successfully"),
        other => panic!("expected Saved, got {:?}", other),
    }
    assert_eq!(tool.stored_description().as_deref(), Some("ML engineer"));
}
