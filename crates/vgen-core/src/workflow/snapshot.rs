//! Resumable workflow state and the report derived from it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::error::WorkflowError;
use super::poll::MAX_POLL_ATTEMPTS;
use crate::job::{Job, JobId, JobRequest};
use crate::retry::{RetryPolicy, RetryState};

/// Successful outcome of one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub job_id: JobId,
    pub path: PathBuf,
    pub bytes: u64,
    /// Set when remote deletion failed or was interrupted; the artifact is
    /// still on disk.
    pub cleanup_warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Submitting,
    Polling,
    Downloading,
    CleaningUp,
    Completed(Completion),
    Failed(WorkflowError),
    Cancelled,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Submitting => "submitting",
            Stage::Polling => "polling",
            Stage::Downloading => "downloading",
            Stage::CleaningUp => "cleaning up",
            Stage::Completed(_) => "completed",
            Stage::Failed(_) => "failed",
            Stage::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed(_) | Stage::Failed(_) | Stage::Cancelled)
    }
}

/// What the snapshot is waiting for. Events that do not match are stale and
/// only refresh the elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Awaiting {
    Nothing,
    Remote,
    Wait,
}

/// Everything needed to resume the workflow after one event. Replaced
/// wholesale on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub stage: Stage,
    pub request: Arc<JobRequest>,
    pub artifact_path: PathBuf,
    pub job: Option<Job>,
    /// Bookkeeping of the current stage's bounded loop.
    pub retry: RetryState,
    /// Clock reading when the workflow started.
    pub origin: Duration,
    /// Time since `origin` as of the last event.
    pub elapsed: Duration,
    pub(crate) downloaded: Option<u64>,
    pub(crate) awaiting: Awaiting,
}

impl Snapshot {
    pub(crate) fn new(request: Arc<JobRequest>, artifact_path: PathBuf, at: Duration) -> Self {
        Self {
            stage: Stage::Submitting,
            request,
            artifact_path,
            job: None,
            retry: RetryState::begin(at),
            origin: at,
            elapsed: Duration::ZERO,
            downloaded: None,
            awaiting: Awaiting::Nothing,
        }
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job.as_ref().map(|j| &j.id)
    }

    /// Non-terminal with nothing outstanding: no event can move it forward.
    pub fn is_idle(&self) -> bool {
        !self.stage.is_terminal() && self.awaiting == Awaiting::Nothing
    }

    pub fn report(&self) -> StatusReport {
        let (artifact, error, warning) = match &self.stage {
            Stage::Completed(done) => (
                Some(done.path.clone()),
                None,
                done.cleanup_warning.clone(),
            ),
            Stage::Failed(e) => (None, Some(e.to_string()), None),
            Stage::Cancelled => (None, Some(WorkflowError::Cancelled.to_string()), None),
            _ => (None, None, None),
        };
        let max_attempts = match self.stage {
            Stage::Submitting => RetryPolicy::submission().max_attempts,
            Stage::Polling => MAX_POLL_ATTEMPTS,
            Stage::Downloading => RetryPolicy::download().max_attempts,
            _ => 1,
        };
        StatusReport {
            stage: self.stage.name(),
            elapsed_secs: self.elapsed.as_secs(),
            attempt: self.retry.attempt,
            max_attempts,
            job_id: self.job_id().map(|id| id.to_string()),
            status: self.job.as_ref().map(|j| j.status.to_string()),
            progress: self.job.as_ref().map(|j| j.progress).unwrap_or(0),
            artifact,
            error,
            warning,
        }
    }
}

/// Per-state-change view handed to front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub stage: &'static str,
    pub elapsed_secs: u64,
    pub attempt: u32,
    pub max_attempts: u32,
    pub job_id: Option<String>,
    pub status: Option<String>,
    pub progress: u8,
    pub artifact: Option<PathBuf>,
    pub error: Option<String>,
    pub warning: Option<String>,
}
