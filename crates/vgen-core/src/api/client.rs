//! Blocking HTTP client for the video API, built on curl.
//!
//! Each method performs exactly one request. Request and response bodies are
//! copied to the injected trace sink when it is enabled.

use anyhow::{bail, Context, Result};
use curl::easy::{Easy, Form, List};
use std::cell::Cell;
use std::path::Path;
use std::str;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::types::{ApiErrorBody, VideoList, VideoObject};
use super::VideoService;
use crate::job::{Job, JobId, JobRequest};
use crate::retry::RemoteError;
use crate::storage::ArtifactWriter;
use crate::trace::{pretty_body, TraceEntry, TraceSink};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONTENT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Client for the `/videos` endpoints.
pub struct SoraClient {
    api_key: String,
    base: Url,
    trace: Arc<dyn TraceSink>,
}

impl SoraClient {
    pub fn new(api_key: impl Into<String>, trace: Arc<dyn TraceSink>) -> Result<Self> {
        Self::with_base(api_key, DEFAULT_API_BASE, trace)
    }

    /// Use a different API root (proxy, test server).
    pub fn with_base(
        api_key: impl Into<String>,
        base: &str,
        trace: Arc<dyn TraceSink>,
    ) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid API base URL: {base}"))?;
        if base.cannot_be_a_base() {
            bail!("API base URL cannot carry a path: {base}");
        }
        Ok(Self {
            api_key: api_key.into(),
            base,
            trace,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn easy(&self, url: &Url, timeout: Duration) -> Result<Easy, RemoteError> {
        let mut easy = Easy::new();
        easy.url(url.as_str())?;
        easy.connect_timeout(CONNECT_TIMEOUT)?;
        easy.timeout(timeout)?;
        let mut headers = List::new();
        headers.append(&format!("Authorization: Bearer {}", self.api_key))?;
        easy.http_headers(headers)?;
        Ok(easy)
    }

    fn trace_request(&self, method: &'static str, url: &Url, body: impl FnOnce() -> String) {
        tracing::debug!(method, url = %url, "api request");
        if self.trace.enabled() {
            self.trace.record(TraceEntry::request(method, url.as_str(), body()));
        }
    }

    fn trace_response(&self, method: &'static str, url: &Url, status: u16, body: impl FnOnce() -> String) {
        tracing::debug!(method, url = %url, status, "api response");
        if self.trace.enabled() {
            self.trace
                .record(TraceEntry::response(method, url.as_str(), status, body()));
        }
    }

    fn trace_failure(&self, method: &'static str, url: &Url, error: &dyn std::fmt::Display) {
        tracing::debug!(method, url = %url, error = %error, "api request failed");
        if self.trace.enabled() {
            self.trace.record(TraceEntry::failure(method, url.as_str(), error));
        }
    }

    /// Perform a buffered request and return the 2xx body.
    fn send(&self, method: &'static str, url: &Url, mut easy: Easy) -> Result<Vec<u8>, RemoteError> {
        let mut body = Vec::new();
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()
        };
        if let Err(e) = performed {
            self.trace_failure(method, url, &e);
            return Err(e.into());
        }
        let status = easy.response_code()? as u16;
        self.trace_response(method, url, status, || pretty_body(&body));
        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(api_error(status, &body))
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &Url) -> Result<T, RemoteError> {
        self.trace_request("GET", url, String::new);
        let mut easy = self.easy(url, REQUEST_TIMEOUT)?;
        easy.get(true)?;
        let body = self.send("GET", url, easy)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl VideoService for SoraClient {
    fn create(&self, request: &JobRequest) -> Result<Job, RemoteError> {
        let url = self.endpoint(&["videos"]);

        let mut form = Form::new();
        form.part("prompt").contents(request.prompt().as_bytes()).add()?;
        form.part("model")
            .contents(request.model().as_str().as_bytes())
            .add()?;
        form.part("seconds")
            .contents(request.seconds().as_str().as_bytes())
            .add()?;
        form.part("size")
            .contents(request.size().as_str().as_bytes())
            .add()?;
        if let Some(reference) = request.reference() {
            form.part("input_reference")
                .buffer(&reference.filename, reference.bytes.clone())
                .content_type(reference.content_type)
                .add()?;
        }

        self.trace_request("POST", &url, || {
            let summary = serde_json::json!({
                "content_type": "multipart/form-data",
                "prompt": request.prompt(),
                "model": request.model().as_str(),
                "seconds": request.seconds().as_str(),
                "size": request.size().as_str(),
                "input_reference": request.reference().map(|r| format!(
                    "{} ({}, {} bytes)",
                    r.filename,
                    r.content_type,
                    r.bytes.len()
                )),
            });
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        });

        let mut easy = self.easy(&url, REQUEST_TIMEOUT)?;
        easy.httppost(form)?;
        let body = self.send("POST", &url, easy)?;
        let video: VideoObject = serde_json::from_slice(&body)?;
        Ok(video.into())
    }

    fn status(&self, id: &JobId) -> Result<Job, RemoteError> {
        let url = self.endpoint(&["videos", id.as_str()]);
        let video: VideoObject = self.get_json(&url)?;
        Ok(video.into())
    }

    fn download(&self, id: &JobId, dest: &Path) -> Result<u64, RemoteError> {
        let url = self.endpoint(&["videos", id.as_str(), "content"]);
        self.trace_request("GET", &url, String::new);

        let mut easy = self.easy(&url, CONTENT_TIMEOUT)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;

        let mut writer = ArtifactWriter::create(dest)?;
        let status = Cell::new(None::<u16>);
        let mut error_body = Vec::new();
        let mut write_error = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| {
                if let Some(code) = parse_status_line(line) {
                    status.set(Some(code));
                }
                true
            })?;
            transfer.write_function(|data| {
                if status.get() == Some(200) {
                    if let Err(e) = writer.write(data) {
                        write_error = Some(e);
                        return Ok(0); // abort transfer
                    }
                } else {
                    error_body.extend_from_slice(data);
                }
                Ok(data.len())
            })?;
            transfer.perform()
        };
        if let Some(e) = write_error {
            self.trace_failure("GET", &url, &e);
            return Err(RemoteError::Storage(e));
        }
        if let Err(e) = performed {
            self.trace_failure("GET", &url, &e);
            return Err(e.into());
        }

        let code = easy.response_code()? as u16;
        if code != 200 {
            self.trace_response("GET", &url, code, || pretty_body(&error_body));
            return Err(api_error(code, &error_body));
        }
        let content_type = easy.content_type()?.unwrap_or("unknown").to_string();
        let written = writer.finalize()?;
        self.trace_response("GET", &url, code, || {
            format!("streamed {written} bytes ({content_type}) to {}", dest.display())
        });
        Ok(written)
    }

    fn delete(&self, id: &JobId) -> Result<(), RemoteError> {
        let url = self.endpoint(&["videos", id.as_str()]);
        self.trace_request("DELETE", &url, String::new);
        let mut easy = self.easy(&url, REQUEST_TIMEOUT)?;
        easy.custom_request("DELETE")?;
        self.send("DELETE", &url, easy)?;
        Ok(())
    }

    fn list(&self, limit: usize) -> Result<Vec<Job>, RemoteError> {
        let mut url = self.endpoint(&["videos"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("order", "desc");
        let list: VideoList = self.get_json(&url)?;
        Ok(list.data.into_iter().map(Job::from).collect())
    }
}

/// Build an `Http` error from a non-2xx response, preferring the structured
/// `{"error": {...}}` message over the raw body.
fn api_error(status: u16, body: &[u8]) -> RemoteError {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => RemoteError::Http {
            status,
            message: parsed.error.message,
            error_type: parsed.error.kind,
        },
        _ => RemoteError::http(status, String::from_utf8_lossy(body).trim().to_string()),
    }
}

/// Status code from an `HTTP/x.y NNN reason` header line.
fn parse_status_line(line: &[u8]) -> Option<u16> {
    let line = str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
