use serde::Deserialize;

use crate::error::{AppError, Result};

/// Triggering event, parsed from the payload based on the runner's event name.
#[derive(Debug, Clone)]
pub enum TriggerEvent {
    /// Relay event: another workflow run completed and this run was started for it.
    WorkflowRun(WorkflowRunEvent),
    /// Any event whose payload carries a pull request.
    PullRequest {
        event_name: String,
        pull_request: PullRequestPayload,
    },
    Other(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunEvent {
    pub workflow_run: Option<WorkflowRunPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunPayload {
    pub id: u64,
    pub head_commit: Option<HeadCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadCommit {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    /// Only needed to tag status comments, so its absence is not an error here.
    pub id: Option<u64>,
    pub number: u64,
    pub head: PullRequestRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRef {
    pub sha: String,
}

#[derive(Deserialize)]
struct PullRequestEnvelope {
    pull_request: Option<PullRequestPayload>,
}

impl TriggerEvent {
    pub fn parse(event_name: &str, payload: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;

        if event_name == "workflow_run" {
            let event: WorkflowRunEvent = serde_json::from_value(value).map_err(|e| {
                AppError::MalformedEvent(format!("Invalid 'workflow_run' payload: {e}"))
            })?;
            return Ok(TriggerEvent::WorkflowRun(event));
        }

        let envelope: PullRequestEnvelope = serde_json::from_value(value).map_err(|e| {
            AppError::MalformedEvent(format!(
                "Invalid 'pull_request' field in {event_name} payload: {e}"
            ))
        })?;

        Ok(match envelope.pull_request {
            Some(pull_request) => TriggerEvent::PullRequest {
                event_name: event_name.to_string(),
                pull_request,
            },
            None => TriggerEvent::Other(event_name.to_string()),
        })
    }

    /// The pull request this event belongs to, if any.
    pub fn pull_request(&self) -> Option<&PullRequestPayload> {
        match self {
            TriggerEvent::PullRequest { pull_request, .. } => Some(pull_request),
            TriggerEvent::WorkflowRun(_) | TriggerEvent::Other(_) => None,
        }
    }
}
