//! Event-driven driver for the interactive session.
//!
//! The session is re-entered once per event: the completion of the single
//! outstanding operation, or a one-second display tick. Remote calls run on
//! the blocking pool and report back over a channel.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::error;

use super::error::WorkflowError;
use super::event::{Event, Operation};
use super::session::Session;
use super::snapshot::{Completion, StatusReport};
use crate::api::VideoService;
use crate::control::AbortToken;
use crate::job::JobRequest;

/// Display refresh interval.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A finished background operation, or the reason it never produced an event.
type Finished = Result<Event, String>;

pub async fn run_interactive(
    service: Arc<dyn VideoService>,
    request: JobRequest,
    artifact_path: PathBuf,
    abort: AbortToken,
    mut observe: impl FnMut(&StatusReport),
) -> Result<Completion, WorkflowError> {
    let origin = Instant::now();
    let (tx, mut rx) = mpsc::unbounded_channel::<Finished>();
    let (mut session, ops) =
        Session::start(Arc::new(request), artifact_path, abort, origin.elapsed());
    observe(&session.report());

    let mut in_flight: Vec<JoinHandle<()>> = ops
        .into_iter()
        .map(|op| dispatch(op, Arc::clone(&service), tx.clone(), origin))
        .collect();

    let mut ticker = time::interval_at(origin + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let outcome = loop {
        if let Some(outcome) = session.outcome() {
            break outcome;
        }
        if session.snapshot().is_idle() {
            break session.interrupted("no pending operation");
        }
        let event = tokio::select! {
            Some(done) = rx.recv() => match done {
                Ok(event) => event,
                Err(cause) => break session.interrupted(&cause),
            },
            _ = ticker.tick() => Event::Tick { at: origin.elapsed() },
        };
        for op in session.handle(event) {
            in_flight.push(dispatch(op, Arc::clone(&service), tx.clone(), origin));
        }
        in_flight.retain(|h| !h.is_finished());
        observe(&session.report());
    };

    // Cancelled or failed with work outstanding: drop it. A blocking call
    // already running finishes on its own and its event is discarded.
    for handle in in_flight {
        handle.abort();
    }
    outcome
}

fn dispatch(
    op: Operation,
    service: Arc<dyn VideoService>,
    tx: mpsc::UnboundedSender<Finished>,
    origin: Instant,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let done = match op {
            Operation::Wait { delay } => {
                time::sleep(delay).await;
                Ok(Event::Waited { at: origin.elapsed() })
            }
            remote => {
                let joined = tokio::task::spawn_blocking(move || {
                    remote.perform(service.as_ref(), || origin.elapsed())
                })
                .await;
                joined.map_err(|e| {
                    error!(error = %e, "background operation did not complete");
                    e.to_string()
                })
            }
        };
        // The receiver is gone once the session has an outcome.
        let _ = tx.send(done);
    })
}
