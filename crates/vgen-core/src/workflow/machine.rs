//! The pure transition function shared by both drivers.
//!
//! `transition` never performs I/O and never reads a clock: every input
//! arrives as an `Event` and every side effect leaves as an `Operation`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::cleanup::{complete, on_deleted};
use super::event::{Event, Operation};
use super::poll::on_polled;
use super::retrieve::on_downloaded;
use super::snapshot::{Awaiting, Snapshot, Stage};
use super::submit::on_submitted;
use crate::job::JobRequest;

/// Initial snapshot plus the first submission attempt.
pub fn start(
    request: Arc<JobRequest>,
    artifact_path: PathBuf,
    at: Duration,
) -> (Snapshot, Vec<Operation>) {
    let mut snap = Snapshot::new(Arc::clone(&request), artifact_path, at);
    info!(
        model = %request.model(),
        seconds = %request.seconds(),
        size = %request.size(),
        reference = request.reference().is_some(),
        "starting generation"
    );
    snap.awaiting = Awaiting::Remote;
    (snap, vec![Operation::Submit { request }])
}

/// Advance `snap` by one event.
pub fn transition(mut snap: Snapshot, event: Event) -> (Snapshot, Vec<Operation>) {
    let at = event.at();
    snap.elapsed = at.saturating_sub(snap.origin);
    if snap.stage.is_terminal() {
        return (snap, Vec::new());
    }

    match (snap.awaiting, event) {
        (_, Event::Tick { .. }) => (snap, Vec::new()),
        (_, Event::Cancel { .. }) => cancel(snap),
        (Awaiting::Wait, Event::Waited { at }) => resume_after_wait(snap, at),
        (Awaiting::Remote, Event::Submitted { at, result }) if snap.stage == Stage::Submitting => {
            snap.awaiting = Awaiting::Nothing;
            on_submitted(snap, at, result)
        }
        (Awaiting::Remote, Event::Polled { at, result }) if snap.stage == Stage::Polling => {
            snap.awaiting = Awaiting::Nothing;
            on_polled(snap, at, result)
        }
        (Awaiting::Remote, Event::Downloaded { at, result })
            if snap.stage == Stage::Downloading =>
        {
            snap.awaiting = Awaiting::Nothing;
            on_downloaded(snap, at, result)
        }
        (Awaiting::Remote, Event::Deleted { at, result }) if snap.stage == Stage::CleaningUp => {
            snap.awaiting = Awaiting::Nothing;
            on_deleted(snap, at, result)
        }
        (awaiting, stale) => {
            debug!(stage = snap.stage.name(), ?awaiting, event = ?stale, "ignoring stale event");
            (snap, Vec::new())
        }
    }
}

/// Re-issue the current stage's remote call once its delay ran out.
fn resume_after_wait(mut snap: Snapshot, _at: Duration) -> (Snapshot, Vec<Operation>) {
    let op = match (&snap.stage, snap.job_id().cloned()) {
        (Stage::Submitting, _) => Operation::Submit {
            request: Arc::clone(&snap.request),
        },
        (Stage::Polling, Some(job_id)) => Operation::Query { job_id },
        (Stage::Downloading, Some(job_id)) => Operation::Download {
            job_id,
            dest: snap.artifact_path.clone(),
        },
        _ => return (snap, Vec::new()),
    };
    snap.awaiting = Awaiting::Remote;
    (snap, vec![op])
}

/// Stop without further remote work. A delete already in flight cannot be
/// recalled, so cancelling during cleanup still reports the saved artifact.
fn cancel(mut snap: Snapshot) -> (Snapshot, Vec<Operation>) {
    if snap.stage == Stage::CleaningUp {
        info!("cancelled during cleanup; artifact is kept");
        return complete(
            snap,
            Some("cancelled before remote deletion was confirmed".to_string()),
        );
    }
    info!(stage = snap.stage.name(), "workflow cancelled");
    snap.stage = Stage::Cancelled;
    snap.awaiting = Awaiting::Nothing;
    (snap, Vec::new())
}
