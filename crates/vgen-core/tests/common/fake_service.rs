//! Scripted in-memory `VideoService` for driving the workflow without a network.
//!
//! Each endpoint pops its next reply from a queue; when the queue is empty a
//! default reply is used (create: queued job, status: in progress, download:
//! writes a small file through `ArtifactWriter`, delete: ok). Call counts are
//! recorded per endpoint.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use vgen_core::api::VideoService;
use vgen_core::control::AbortToken;
use vgen_core::job::{Job, JobFailure, JobId, JobRequest, JobStatus};
use vgen_core::retry::RemoteError;
use vgen_core::storage::ArtifactWriter;

pub const JOB_ID: &str = "video_1";
pub const ARTIFACT: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake video";

/// A scripted reply: `Err((status, message))` becomes an HTTP error.
pub type Reply<T> = Result<T, (u16, &'static str)>;

#[derive(Default)]
pub struct FakeService {
    creates: Mutex<VecDeque<Reply<JobStatus>>>,
    statuses: Mutex<VecDeque<Reply<Job>>>,
    downloads: Mutex<VecDeque<Reply<()>>>,
    deletes: Mutex<VecDeque<Reply<()>>>,
    abort_after_polls: Option<(u32, AbortToken)>,
    abort_on_download: Option<AbortToken>,
    pub create_calls: AtomicU32,
    pub status_calls: AtomicU32,
    pub download_calls: AtomicU32,
    pub delete_calls: AtomicU32,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creates(self, replies: Vec<Reply<JobStatus>>) -> Self {
        *self.creates.lock().unwrap() = replies.into();
        self
    }

    pub fn statuses(self, replies: Vec<Reply<Job>>) -> Self {
        *self.statuses.lock().unwrap() = replies.into();
        self
    }

    pub fn downloads(self, replies: Vec<Reply<()>>) -> Self {
        *self.downloads.lock().unwrap() = replies.into();
        self
    }

    pub fn deletes(self, replies: Vec<Reply<()>>) -> Self {
        *self.deletes.lock().unwrap() = replies.into();
        self
    }

    /// Raise `abort` from inside the `n`th status query.
    pub fn abort_after_polls(mut self, n: u32, abort: AbortToken) -> Self {
        self.abort_after_polls = Some((n, abort));
        self
    }

    /// Raise `abort` from inside every download, before its reply.
    pub fn abort_on_download(mut self, abort: AbortToken) -> Self {
        self.abort_on_download = Some(abort);
        self
    }

    pub fn calls(&self) -> (u32, u32, u32, u32) {
        (
            self.create_calls.load(Ordering::SeqCst),
            self.status_calls.load(Ordering::SeqCst),
            self.download_calls.load(Ordering::SeqCst),
            self.delete_calls.load(Ordering::SeqCst),
        )
    }
}

pub fn job(status: JobStatus, progress: u8) -> Job {
    Job::new(JOB_ID, status).with_progress(progress)
}

pub fn failed_job(message: &str) -> Job {
    job(JobStatus::Failed, 0).with_error(JobFailure {
        message: message.to_string(),
        kind: None,
        code: None,
    })
}

fn next<T>(queue: &Mutex<VecDeque<Reply<T>>>, default: impl FnOnce() -> T) -> Result<T, RemoteError> {
    match queue.lock().unwrap().pop_front() {
        Some(Ok(v)) => Ok(v),
        Some(Err((status, message))) => Err(RemoteError::http(status, message)),
        None => Ok(default()),
    }
}

impl VideoService for FakeService {
    fn create(&self, _request: &JobRequest) -> Result<Job, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.creates, || JobStatus::Queued).map(|status| job(status, 0))
    }

    fn status(&self, _id: &JobId) -> Result<Job, RemoteError> {
        let n = self.status_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, abort)) = &self.abort_after_polls {
            if n >= *after {
                abort.raise();
            }
        }
        next(&self.statuses, || job(JobStatus::InProgress, 50))
    }

    fn download(&self, _id: &JobId, dest: &Path) -> Result<u64, RemoteError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(abort) = &self.abort_on_download {
            abort.raise();
        }
        next(&self.downloads, || ())?;
        let mut writer = ArtifactWriter::create(dest)?;
        writer.write(ARTIFACT)?;
        Ok(writer.finalize()?)
    }

    fn delete(&self, _id: &JobId) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.deletes, || ())
    }

    fn list(&self, limit: usize) -> Result<Vec<Job>, RemoteError> {
        Ok((0..limit.min(3))
            .map(|i| Job::new(format!("video_{i}"), JobStatus::Completed))
            .collect())
    }
}
