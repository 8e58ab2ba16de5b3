//! Best-effort remote deletion after a confirmed download.

use std::time::Duration;
use tracing::{info, warn};

use super::event::Operation;
use super::snapshot::{Awaiting, Completion, Snapshot, Stage};
use crate::retry::RemoteError;

pub(super) fn on_deleted(
    snap: Snapshot,
    _at: Duration,
    result: Result<(), RemoteError>,
) -> (Snapshot, Vec<Operation>) {
    let warning = match result {
        Ok(()) => {
            info!(job_id = ?snap.job_id(), "remote job deleted");
            None
        }
        Err(e) => {
            warn!(job_id = ?snap.job_id(), error = %e, "failed to delete remote job");
            Some(format!("failed to delete video from service: {e}"))
        }
    };
    complete(snap, warning)
}

pub(super) fn complete(mut snap: Snapshot, warning: Option<String>) -> (Snapshot, Vec<Operation>) {
    let job_id = snap.job_id().cloned().unwrap_or_else(|| "".into());
    snap.stage = Stage::Completed(Completion {
        job_id,
        path: snap.artifact_path.clone(),
        bytes: snap.downloaded.unwrap_or(0),
        cleanup_warning: warning,
    });
    snap.awaiting = Awaiting::Nothing;
    (snap, Vec::new())
}
