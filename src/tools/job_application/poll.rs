//! Waiting for an assistant run to finish

use std::future::Future;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::{JobToolError, JobToolResult, PollPolicy};
use crate::llm::{AssistantsApi, Run};

/// Await a remote call unless `cancel` fires first.
///
/// `stage` describes the step for the `Cancelled` error. A token that is
/// already cancelled wins before the call is polled at all.
pub async fn cancellable<T, F>(cancel: &CancellationToken, stage: &str, call: F) -> JobToolResult<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::warn!("Generation cancelled while {}", stage);
            Err(JobToolError::Cancelled { stage: stage.to_string() })
        }
        result = call => result.map_err(JobToolError::remote),
    }
}

/// Poll `run` until its status is terminal.
///
/// Sleeps between checks according to `policy`, fails with `Timeout` once the
/// policy deadline has passed, and with `Cancelled` as soon as `cancel` fires.
/// Errors from the status request abort the wait.
pub async fn wait_for_run(
    api: &dyn AssistantsApi,
    thread_id: &str,
    mut run: Run,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> JobToolResult<Run> {
    let started = Instant::now();
    let mut interval = policy.initial_interval;
    let mut polls: u32 = 0;

    while run.status.is_pending() {
        let elapsed = started.elapsed();
        if elapsed >= policy.deadline {
            tracing::warn!(
                "Run {} still {} after {} polls, giving up",
                run.id,
                run.status,
                polls
            );
            return Err(JobToolError::Timeout {
                run_id: run.id,
                status: run.status.to_string(),
                elapsed_secs: elapsed.as_secs(),
            });
        }

        let delay = interval.min(policy.deadline - elapsed);
        let stage = format!("waiting for assistant run {}", run.id);
        cancellable(cancel, &stage, async {
            sleep(delay).await;
            Ok::<(), anyhow::Error>(())
        })
        .await?;

        let run_id = run.id.clone();
        run = cancellable(cancel, &stage, api.retrieve_run(thread_id, &run_id)).await?;

        polls += 1;
        interval = policy.next_interval(interval);
        tracing::debug!("Run {} status after poll #{}: {}", run.id, polls, run.status);
    }

    tracing::info!("Run {} finished with status {} after {} polls", run.id, run.status, polls);
    Ok(run)
}
