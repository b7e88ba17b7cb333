pub mod events;

use crate::config::RunnerEnv;
use crate::error::{AppError, Result};
use events::TriggerEvent;

/// Commit and run the current execution should report against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub commit_sha: String,
    pub run_id: u64,
}

/// Read and parse the event payload the runner points at.
///
/// Without an event path there is nothing to inspect, so the event is treated as
/// an opaque `Other` and resolution falls back to the runner's own sha.
pub fn load_event(runner: &RunnerEnv) -> Result<TriggerEvent> {
    let Some(path) = runner.event_path.as_ref() else {
        return Ok(TriggerEvent::Other(runner.event_name.clone()));
    };

    let payload = std::fs::read(path).map_err(|e| {
        AppError::MalformedEvent(format!(
            "Failed to read event payload at {}: {e}",
            path.display()
        ))
    })?;

    TriggerEvent::parse(&runner.event_name, &payload)
}

/// Pick the commit sha and run id the current execution was triggered for.
pub fn resolve_trigger_context(
    runner: &RunnerEnv,
    event: &TriggerEvent,
) -> Result<TriggerContext> {
    match event {
        TriggerEvent::WorkflowRun(e) => {
            tracing::info!(
                "Action was triggered by workflow_run: using SHA and RUN_ID from triggering workflow"
            );
            let run = e.workflow_run.as_ref().ok_or_else(|| {
                AppError::MalformedEvent(
                    "Event of type 'workflow_run' is missing 'workflow_run' field".to_string(),
                )
            })?;
            let head_commit = run.head_commit.as_ref().ok_or_else(|| {
                AppError::MalformedEvent(
                    "Event of type 'workflow_run' is missing 'workflow_run.head_commit' field"
                        .to_string(),
                )
            })?;
            Ok(TriggerContext {
                commit_sha: head_commit.id.clone(),
                run_id: run.id,
            })
        }
        TriggerEvent::PullRequest {
            event_name,
            pull_request,
        } => {
            tracing::info!(
                event_name = %event_name,
                "Action was triggered by a pull request event: using SHA from head of source branch"
            );
            Ok(TriggerContext {
                commit_sha: pull_request.head.sha.clone(),
                run_id: runner.run_id,
            })
        }
        TriggerEvent::Other(_) => Ok(TriggerContext {
            commit_sha: runner.sha.clone(),
            run_id: runner.run_id,
        }),
    }
}
