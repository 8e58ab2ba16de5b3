//! Job request and remote job model.
//!
//! `JobRequest` is validated on construction: every field is a member of its
//! closed set, so a request that exists can always be submitted. `Job` is the
//! server's view of one generation task as last reported.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::reference::ReferenceImage;

/// Longest prompt accepted for submission, in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Invalid request parameters, detected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("prompt is {len} characters long; the limit is {max}")]
    PromptTooLong { len: usize, max: usize },
    #[error("invalid model '{0}'. Supported values are: 'sora-2' and 'sora-2-pro'")]
    Model(String),
    #[error("invalid duration '{0}'. Supported values are: '4', '8', and '12'")]
    Duration(String),
    #[error(
        "invalid size '{0}'. Supported values are: '1280x720', '720x1280', '1792x1024', and '1024x1792'"
    )]
    Size(String),
}

/// Generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    Sora2,
    Sora2Pro,
}

impl Model {
    pub fn as_str(self) -> &'static str {
        match self {
            Model::Sora2 => "sora-2",
            Model::Sora2Pro => "sora-2-pro",
        }
    }
}

impl FromStr for Model {
    type Err = PreconditionError;

    /// Accepts the wire names and the short aliases `sora` / `sora-pro`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sora-2" | "sora" => Ok(Model::Sora2),
            "sora-2-pro" | "sora-pro" => Ok(Model::Sora2Pro),
            other => Err(PreconditionError::Model(other.to_string())),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clip duration. Only 4, 8 and 12 seconds are offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seconds {
    #[default]
    Four,
    Eight,
    Twelve,
}

impl Seconds {
    pub fn as_secs(self) -> u32 {
        match self {
            Seconds::Four => 4,
            Seconds::Eight => 8,
            Seconds::Twelve => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Seconds::Four => "4",
            Seconds::Eight => "8",
            Seconds::Twelve => "12",
        }
    }
}

impl FromStr for Seconds {
    type Err = PreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4" => Ok(Seconds::Four),
            "8" => Ok(Seconds::Eight),
            "12" => Ok(Seconds::Twelve),
            other => Err(PreconditionError::Duration(other.to_string())),
        }
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output frame size (`WIDTHxHEIGHT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameSize {
    #[default]
    Landscape1280x720,
    Portrait720x1280,
    Landscape1792x1024,
    Portrait1024x1792,
}

impl FrameSize {
    pub const ALL: [FrameSize; 4] = [
        FrameSize::Landscape1280x720,
        FrameSize::Portrait720x1280,
        FrameSize::Landscape1792x1024,
        FrameSize::Portrait1024x1792,
    ];

    /// (width, height) in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            FrameSize::Landscape1280x720 => (1280, 720),
            FrameSize::Portrait720x1280 => (720, 1280),
            FrameSize::Landscape1792x1024 => (1792, 1024),
            FrameSize::Portrait1024x1792 => (1024, 1792),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FrameSize::Landscape1280x720 => "1280x720",
            FrameSize::Portrait720x1280 => "720x1280",
            FrameSize::Landscape1792x1024 => "1792x1024",
            FrameSize::Portrait1024x1792 => "1024x1792",
        }
    }
}

impl FromStr for FrameSize {
    type Err = PreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FrameSize::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| PreconditionError::Size(s.to_string()))
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, immutable generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    prompt: String,
    model: Model,
    seconds: Seconds,
    size: FrameSize,
    reference: Option<ReferenceImage>,
}

impl JobRequest {
    pub fn new(
        prompt: impl Into<String>,
        model: Model,
        seconds: Seconds,
        size: FrameSize,
    ) -> Result<Self, PreconditionError> {
        let prompt = prompt.into();
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return Err(PreconditionError::EmptyPrompt);
        }
        let len = trimmed.chars().count();
        if len > MAX_PROMPT_CHARS {
            return Err(PreconditionError::PromptTooLong {
                len,
                max: MAX_PROMPT_CHARS,
            });
        }
        Ok(Self {
            prompt: trimmed.to_string(),
            model,
            seconds,
            size,
            reference: None,
        })
    }

    /// Validate string-form parameters (as typed by a user or read from config).
    pub fn parse(
        prompt: &str,
        model: &str,
        seconds: &str,
        size: &str,
    ) -> Result<Self, PreconditionError> {
        let model = model.parse()?;
        let seconds = seconds.parse()?;
        let size = size.parse()?;
        Self::new(prompt, model, seconds, size)
    }

    /// Attach a reference image. It must already be sized to `self.size()`.
    pub fn with_reference(mut self, reference: ReferenceImage) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn seconds(&self) -> Seconds {
        self.seconds
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    pub fn reference(&self) -> Option<&ReferenceImage> {
        self.reference.as_ref()
    }
}

/// Opaque server-issued job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        JobId(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        JobId(id.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote job status. Unknown values are kept verbatim and treated as pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s,
        }
    }

    /// Only `completed` and `failed` end polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "queued" => JobStatus::Queued,
            "in_progress" => JobStatus::InProgress,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure attached to a job by the service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobFailure {
    pub message: String,
    pub kind: Option<String>,
    pub code: Option<String>,
}

/// Server-side state of one generation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// 0-100. A display hint only; completion is signalled by `status`.
    pub progress: u8,
    pub error: Option<JobFailure>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub model: Option<String>,
    pub seconds: Option<String>,
    pub size: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            progress: 0,
            error: None,
            created_at: None,
            completed_at: None,
            expires_at: None,
            model: None,
            seconds: None,
            size: None,
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_error(mut self, error: JobFailure) -> Self {
        self.error = Some(error);
        self
    }
}
