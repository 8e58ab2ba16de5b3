//! JSON bodies exchanged with the video API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::job::{Job, JobFailure, JobId, JobStatus};

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorObject {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// `{"error": {...}}` envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ErrorObject,
}

/// Video object returned by create, retrieve and list.
#[derive(Debug, Deserialize)]
pub(crate) struct VideoObject {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<ErrorObject>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub seconds: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoList {
    #[serde(default)]
    pub data: Vec<VideoObject>,
}

fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.filter(|s| *s > 0)
        .and_then(|s| DateTime::from_timestamp(s, 0))
}

impl From<VideoObject> for Job {
    fn from(v: VideoObject) -> Self {
        let progress = v.progress.unwrap_or(0.0).clamp(0.0, 100.0) as u8;
        Job {
            id: JobId::from(v.id),
            status: JobStatus::from(v.status.as_str()),
            progress,
            error: v.error.map(|e| JobFailure {
                message: e.message,
                kind: e.kind,
                code: e.code,
            }),
            created_at: timestamp(v.created_at),
            completed_at: timestamp(v.completed_at),
            expires_at: timestamp(v.expires_at),
            model: v.model,
            seconds: v.seconds,
            size: v.size,
        }
    }
}
