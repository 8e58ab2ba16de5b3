//! One workflow instance with abort checking at every re-entry.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::error::WorkflowError;
use super::event::{Event, Operation};
use super::machine::{start, transition};
use super::snapshot::{Completion, Snapshot, Stage, StatusReport};
use crate::control::AbortToken;
use crate::job::JobRequest;

pub struct Session {
    snapshot: Snapshot,
    abort: AbortToken,
}

impl Session {
    pub fn start(
        request: Arc<JobRequest>,
        artifact_path: PathBuf,
        abort: AbortToken,
        at: Duration,
    ) -> (Self, Vec<Operation>) {
        let (snapshot, ops) = start(request, artifact_path, at);
        (Self { snapshot, abort }, ops)
    }

    /// Feed one event. Once the abort token is raised, events are turned
    /// into a cancellation until the artifact is confirmed on disk. From then
    /// on the workflow runs its cleanup to the end.
    pub fn handle(&mut self, event: Event) -> Vec<Operation> {
        let event = match event {
            Event::Deleted { .. } | Event::Cancel { .. } => event,
            Event::Downloaded { result: Ok(_), .. } => event,
            other if self.abort.is_raised() && self.snapshot.stage != Stage::CleaningUp => {
                Event::Cancel { at: other.at() }
            }
            other => other,
        };
        let (next, ops) = transition(self.snapshot.clone(), event);
        self.snapshot = next;
        ops
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn report(&self) -> StatusReport {
        self.snapshot.report()
    }

    pub fn is_finished(&self) -> bool {
        self.snapshot.stage.is_terminal()
    }

    /// `None` while the workflow is still running.
    pub fn outcome(&self) -> Option<Result<Completion, WorkflowError>> {
        match &self.snapshot.stage {
            Stage::Completed(done) => Some(Ok(done.clone())),
            Stage::Failed(e) => Some(Err(e.clone())),
            Stage::Cancelled => Some(Err(WorkflowError::Cancelled)),
            _ => None,
        }
    }

    /// Outcome for a driver that has nothing left to wait on.
    pub(crate) fn interrupted(&self, cause: &str) -> Result<Completion, WorkflowError> {
        self.outcome().unwrap_or_else(|| {
            Err(WorkflowError::Interrupted {
                stage: self.snapshot.stage.name(),
                cause: cause.to_string(),
            })
        })
    }
}
