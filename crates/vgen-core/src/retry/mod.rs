//! Failure classification and backoff.
//!
//! A failed remote call is labelled terminal-client, retryable-server or
//! retryable-transient; each bounded retry loop owns a `RetryPolicy` that maps
//! (attempt, classification) to a decision. The workflow stages share these so
//! both drive modes retry identically.

mod classify;
mod error;
mod policy;
mod state;

pub use classify::{classify, classify_content, classify_curl_error, classify_http_status, FailureClass};
pub use error::RemoteError;
pub use policy::{Backoff, RetryDecision, RetryPolicy};
pub use state::RetryState;
