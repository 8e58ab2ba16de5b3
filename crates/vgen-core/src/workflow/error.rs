//! Workflow outcome errors.

use std::fmt;
use thiserror::Error;

use crate::job::JobId;

/// Stage of the workflow an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    Submit,
    Poll,
    Retrieve,
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageName::Submit => "job submission",
            StageName::Poll => "status check",
            StageName::Retrieve => "download",
        })
    }
}

/// Why a started workflow did not complete. Invalid parameters never get
/// this far: they fail as `PreconditionError` when the `JobRequest` is built.
/// Cleanup failures are not errors; they are carried as a warning on the
/// successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The service rejected the request. Not retried.
    #[error("{stage} rejected{}: {message}", status_suffix(.status))]
    Rejected {
        stage: StageName,
        status: Option<u16>,
        message: String,
    },
    /// Retryable server failures outlasted the attempt budget.
    #[error("{stage} failed after {attempts} attempts: {cause}")]
    Exhausted {
        stage: StageName,
        attempts: u32,
        cause: String,
    },
    /// The artifact never materialized within the download budget.
    #[error("video content not available after {attempts} attempts ({}): {cause}", minutes(.window_secs))]
    ContentUnavailable {
        attempts: u32,
        window_secs: u64,
        cause: String,
    },
    /// A call failed in a way this stage does not retry.
    #[error("{stage} failed on attempt {attempt}: {cause}")]
    Remote {
        stage: StageName,
        attempt: u32,
        cause: String,
    },
    /// The job itself reported `failed`.
    #[error("video generation failed{}", message_suffix(.message))]
    JobFailed { job_id: JobId, message: Option<String> },
    /// Polling hit its attempt ceiling without a terminal status.
    #[error("timed out waiting for video generation after {elapsed_secs}s ({attempts} status checks)")]
    TimedOut { attempts: u32, elapsed_secs: u64 },
    /// The driver lost track of the pending operation (stalled or panicked).
    #[error("workflow interrupted while {stage}: {cause}")]
    Interrupted { stage: &'static str, cause: String },
    #[error("cancelled by user")]
    Cancelled,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .filter(|m| !m.is_empty())
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

fn minutes(secs: &u64) -> String {
    let secs = *secs;
    if secs >= 60 && secs % 60 == 0 {
        let m = secs / 60;
        format!("{m} minute{}", if m == 1 { "" } else { "s" })
    } else {
        format!("{secs}s")
    }
}
