//! Inputs to and outputs of the workflow transition function.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::VideoService;
use crate::job::{Job, JobId, JobRequest};
use crate::retry::RemoteError;

/// One external event fed to the workflow. `at` is a reading of the driver's
/// clock when the event was produced.
#[derive(Debug)]
pub enum Event {
    /// Display timer; only refreshes elapsed time.
    Tick { at: Duration },
    /// A `Wait` operation finished.
    Waited { at: Duration },
    Submitted { at: Duration, result: Result<Job, RemoteError> },
    Polled { at: Duration, result: Result<Job, RemoteError> },
    Downloaded { at: Duration, result: Result<u64, RemoteError> },
    Deleted { at: Duration, result: Result<(), RemoteError> },
    /// The user asked to stop.
    Cancel { at: Duration },
}

impl Event {
    pub fn at(&self) -> Duration {
        match self {
            Event::Tick { at }
            | Event::Waited { at }
            | Event::Submitted { at, .. }
            | Event::Polled { at, .. }
            | Event::Downloaded { at, .. }
            | Event::Deleted { at, .. }
            | Event::Cancel { at } => *at,
        }
    }
}

/// Work the workflow wants done before it can make progress. The driver
/// performs it and reports back with exactly one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Submit { request: Arc<JobRequest> },
    Wait { delay: Duration },
    Query { job_id: JobId },
    Download { job_id: JobId, dest: PathBuf },
    Delete { job_id: JobId },
}

impl Operation {
    /// Run one remote operation and wrap its result as the matching event.
    ///
    /// `Wait` is not slept here; drivers schedule waits themselves (blocking
    /// sleep or timer) and only use this to produce the `Waited` event.
    pub fn perform(&self, service: &dyn VideoService, now: impl Fn() -> Duration) -> Event {
        match self {
            Operation::Submit { request } => {
                let result = service.create(request);
                Event::Submitted { at: now(), result }
            }
            Operation::Wait { .. } => Event::Waited { at: now() },
            Operation::Query { job_id } => {
                let result = service.status(job_id);
                Event::Polled { at: now(), result }
            }
            Operation::Download { job_id, dest } => {
                let result = service.download(job_id, dest);
                Event::Downloaded { at: now(), result }
            }
            Operation::Delete { job_id } => {
                let result = service.delete(job_id);
                Event::Deleted { at: now(), result }
            }
        }
    }
}
