//! Remote video service: the contract the workflow consumes and its HTTP
//! implementation.

mod client;
mod types;

pub use client::{SoraClient, DEFAULT_API_BASE};

use std::path::Path;

use crate::job::{Job, JobId, JobRequest};
use crate::retry::RemoteError;

/// Calls the workflow makes against the service. Each call is one attempt;
/// retries belong to the workflow.
pub trait VideoService: Send + Sync {
    /// Create a generation job.
    fn create(&self, request: &JobRequest) -> Result<Job, RemoteError>;

    /// Fetch current status and progress of a job.
    fn status(&self, id: &JobId) -> Result<Job, RemoteError>;

    /// Persist the finished artifact at `dest`, creating missing parent
    /// directories. Returns the bytes written. Must not leave a partial file
    /// at `dest` on failure.
    fn download(&self, id: &JobId, dest: &Path) -> Result<u64, RemoteError>;

    /// Delete the job and its stored artifact from the service.
    fn delete(&self, id: &JobId) -> Result<(), RemoteError>;

    /// Most recent jobs, newest first.
    fn list(&self, limit: usize) -> Result<Vec<Job>, RemoteError>;
}
