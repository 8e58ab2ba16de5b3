//! Blocking driver: run the workflow to completion on the calling thread.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::WorkflowError;
use super::event::{Event, Operation};
use super::session::Session;
use super::snapshot::{Completion, StatusReport};
use crate::api::VideoService;
use crate::clock::Clock;
use crate::control::AbortToken;
use crate::job::JobRequest;

/// Submit, poll, download and clean up, blocking until there is an outcome.
/// `observe` is called after every state change.
pub fn run_batch(
    service: &dyn VideoService,
    clock: &dyn Clock,
    abort: &AbortToken,
    request: JobRequest,
    artifact_path: PathBuf,
    observe: &mut dyn FnMut(&StatusReport),
) -> Result<Completion, WorkflowError> {
    let (mut session, ops) =
        Session::start(Arc::new(request), artifact_path, abort.clone(), clock.now());
    observe(&session.report());

    let mut pending: VecDeque<Operation> = ops.into();
    while let Some(op) = pending.pop_front() {
        // A delete is only issued for a confirmed artifact and always runs.
        let cancelled = abort.is_raised() && !matches!(op, Operation::Delete { .. });
        let event = if cancelled {
            Event::Cancel { at: clock.now() }
        } else {
            match &op {
                Operation::Wait { delay } => {
                    if clock.sleep(*delay, abort) {
                        Event::Waited { at: clock.now() }
                    } else {
                        Event::Cancel { at: clock.now() }
                    }
                }
                remote => remote.perform(service, || clock.now()),
            }
        };
        pending.extend(session.handle(event));
        observe(&session.report());
    }
    session.interrupted("no pending operation")
}
