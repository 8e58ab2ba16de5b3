//! Adaptive status polling.

use std::time::Duration;
use tracing::{debug, info};

use super::error::{StageName, WorkflowError};
use super::event::Operation;
use super::snapshot::{Awaiting, Snapshot, Stage};
use super::submit::fail;
use crate::job::{Job, JobStatus};
use crate::retry::{RemoteError, RetryState};

/// Status queries before giving up.
pub const MAX_POLL_ATTEMPTS: u32 = 200;

const FAST_INTERVAL: Duration = Duration::from_secs(10);
const SLOW_INTERVAL: Duration = Duration::from_secs(30);
/// Polling switches to the slow interval after this long.
const FAST_PHASE: Duration = Duration::from_secs(120);

/// Delay before status query `attempt` (1-based). `elapsed` is time since
/// polling began; `progress` is the last reported percentage.
pub fn poll_interval(attempt: u32, elapsed: Duration, progress: u8) -> Duration {
    if attempt <= 1 {
        Duration::ZERO
    } else if progress >= 100 || elapsed < FAST_PHASE {
        FAST_INTERVAL
    } else {
        SLOW_INTERVAL
    }
}

pub(super) fn on_polled(
    mut snap: Snapshot,
    at: Duration,
    result: Result<Job, RemoteError>,
) -> (Snapshot, Vec<Operation>) {
    let attempt = snap.retry.attempt;
    let job = match result {
        Ok(job) => job,
        Err(e) => {
            return fail(
                snap,
                WorkflowError::Remote {
                    stage: StageName::Poll,
                    attempt,
                    cause: e.to_string(),
                },
            )
        }
    };
    debug!(job_id = %job.id, status = %job.status, progress = job.progress, attempt, "status");

    match job.status {
        JobStatus::Completed => {
            info!(job_id = %job.id, polls = attempt, "generation completed");
            let job_id = job.id.clone();
            let dest = snap.artifact_path.clone();
            snap.job = Some(job);
            snap.stage = Stage::Downloading;
            snap.retry = RetryState::begin(at);
            snap.awaiting = Awaiting::Remote;
            (snap, vec![Operation::Download { job_id, dest }])
        }
        JobStatus::Failed => {
            let error = WorkflowError::JobFailed {
                job_id: job.id.clone(),
                message: job.error.as_ref().map(|e| e.message.clone()),
            };
            snap.job = Some(job);
            fail(snap, error)
        }
        _ => {
            let progress = job.progress;
            snap.job = Some(job);
            if attempt >= MAX_POLL_ATTEMPTS {
                let elapsed_secs = snap.retry.elapsed(at).as_secs();
                return fail(snap, WorkflowError::TimedOut { attempts: attempt, elapsed_secs });
            }
            snap.retry.advance();
            let delay = poll_interval(snap.retry.attempt, snap.retry.elapsed(at), progress);
            snap.awaiting = Awaiting::Wait;
            (snap, vec![Operation::Wait { delay }])
        }
    }
}
