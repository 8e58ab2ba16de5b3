//! Generation workflow: submit, poll, retrieve, clean up.
//!
//! Both drivers feed events through the same pure [`transition`] function and
//! differ only in how they perform the operations it returns.

mod batch;
mod cleanup;
mod error;
mod event;
mod interactive;
mod machine;
mod poll;
mod retrieve;
mod session;
mod snapshot;
mod submit;

pub use batch::run_batch;
pub use error::{StageName, WorkflowError};
pub use event::{Event, Operation};
pub use interactive::{run_interactive, TICK_INTERVAL};
pub use machine::{start, transition};
pub use poll::{poll_interval, MAX_POLL_ATTEMPTS};
pub use retrieve::artifact_path;
pub use session::Session;
pub use snapshot::{Completion, Snapshot, Stage, StatusReport};
pub use submit::annotate;
