//! User abort signal for the running workflow.
//!
//! The front end holds one clone and raises it (e.g. on Ctrl-C); the drivers
//! check it at every re-entry and while sleeping between attempts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, clonable abort flag. Once raised it stays raised.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the workflow.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
