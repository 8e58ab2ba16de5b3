//! Job submission: retry server failures with exponential backoff.

use std::time::Duration;
use tracing::{info, warn};

use super::error::{StageName, WorkflowError};
use super::event::Operation;
use super::snapshot::{Awaiting, Snapshot, Stage};
use crate::job::{FrameSize, Job};
use crate::retry::{classify, RemoteError, RetryDecision, RetryPolicy, RetryState};

const SIZE_MISMATCH: &str = "must match the requested width and height";

pub(super) fn on_submitted(
    mut snap: Snapshot,
    at: Duration,
    result: Result<Job, RemoteError>,
) -> (Snapshot, Vec<Operation>) {
    match result {
        Ok(job) => {
            info!(job_id = %job.id, status = %job.status, attempt = snap.retry.attempt, "job submitted");
            let job_id = job.id.clone();
            snap.job = Some(job);
            snap.stage = Stage::Polling;
            snap.retry = RetryState::begin(at);
            snap.awaiting = Awaiting::Remote;
            (snap, vec![Operation::Query { job_id }])
        }
        Err(e) => {
            let policy = RetryPolicy::submission();
            let class = classify(&e);
            let attempt = snap.retry.attempt;
            match policy.decide(attempt, class) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(attempt, error = %e, retry_in = ?delay, "job submission failed, retrying");
                    snap.retry.record_failure(class);
                    snap.retry.advance();
                    snap.awaiting = Awaiting::Wait;
                    (snap, vec![Operation::Wait { delay }])
                }
                RetryDecision::Exhausted => {
                    snap.retry.record_failure(class);
                    fail(
                        snap,
                        WorkflowError::Exhausted {
                            stage: StageName::Submit,
                            attempts: attempt,
                            cause: e.to_string(),
                        },
                    )
                }
                RetryDecision::NoRetry => {
                    snap.retry.record_failure(class);
                    let message = annotate(e.message(), snap.request.size());
                    fail(
                        snap,
                        WorkflowError::Rejected {
                            stage: StageName::Submit,
                            status: e.status(),
                            message,
                        },
                    )
                }
            }
        }
    }
}

pub(super) fn fail(mut snap: Snapshot, error: WorkflowError) -> (Snapshot, Vec<Operation>) {
    tracing::error!(stage = snap.stage.name(), error = %error, "workflow failed");
    snap.stage = Stage::Failed(error);
    snap.awaiting = Awaiting::Nothing;
    (snap, Vec::new())
}

/// Append a hint to the service's reference-size mismatch message.
pub fn annotate(message: String, size: FrameSize) -> String {
    if !message.contains(SIZE_MISMATCH) {
        return message;
    }
    format!(
        "{message}\n\nHint: the reference image must be exactly {size} pixels to match the requested video size.\n\
         Resize the image or pick a video size matching its dimensions."
    )
}
