//! Artifact retrieval with its own fixed-interval retry loop.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::error::{StageName, WorkflowError};
use super::event::Operation;
use super::snapshot::{Awaiting, Snapshot, Stage};
use super::submit::fail;
use crate::retry::{classify_content, FailureClass, RemoteError, RetryDecision, RetryPolicy};

/// `<dir>/sora_video_<YYYYMMDD_HHMMSS>.mp4`.
pub fn artifact_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
    dir.join(format!("sora_video_{}.mp4", at.format("%Y%m%d_%H%M%S")))
}

pub(super) fn on_downloaded(
    mut snap: Snapshot,
    _at: Duration,
    result: Result<u64, RemoteError>,
) -> (Snapshot, Vec<Operation>) {
    let attempt = snap.retry.attempt;
    let Some(job_id) = snap.job_id().cloned() else {
        return fail(
            snap,
            WorkflowError::Interrupted {
                stage: "downloading",
                cause: "no job id".into(),
            },
        );
    };
    match result {
        Ok(bytes) => {
            info!(%job_id, bytes, path = %snap.artifact_path.display(), attempt, "artifact saved");
            snap.downloaded = Some(bytes);
            snap.stage = Stage::CleaningUp;
            snap.awaiting = Awaiting::Remote;
            (snap, vec![Operation::Delete { job_id }])
        }
        Err(e) => {
            let policy = RetryPolicy::download();
            let class = classify_content(&e);
            snap.retry.record_failure(class);
            match policy.decide(attempt, class) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(%job_id, attempt, error = %e, "content not ready, retrying");
                    snap.retry.advance();
                    snap.awaiting = Awaiting::Wait;
                    (snap, vec![Operation::Wait { delay }])
                }
                RetryDecision::Exhausted => {
                    let error = WorkflowError::ContentUnavailable {
                        attempts: attempt,
                        window_secs: policy.window().as_secs(),
                        cause: e.to_string(),
                    };
                    fail(snap, error)
                }
                RetryDecision::NoRetry if class == FailureClass::TerminalClient => {
                    let error = WorkflowError::Rejected {
                        stage: StageName::Retrieve,
                        status: e.status(),
                        message: e.message(),
                    };
                    fail(snap, error)
                }
                RetryDecision::NoRetry => {
                    let error = WorkflowError::Remote {
                        stage: StageName::Retrieve,
                        attempt,
                        cause: e.to_string(),
                    };
                    fail(snap, error)
                }
            }
        }
    }
}
