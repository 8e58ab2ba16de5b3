//! Diagnostic record of recent wire traffic.
//!
//! The HTTP client writes one entry per request and one per response into an
//! injected `TraceSink`. Nothing reads the trace to make decisions; it exists
//! so `--debug` can show what went over the wire.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Entries kept by the default ring.
pub const TRACE_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

/// One request or response record.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub direction: Direction,
    pub method: &'static str,
    pub url: String,
    /// Response status; `None` for requests.
    pub status: Option<u16>,
    pub body: String,
    pub at: DateTime<Local>,
}

impl TraceEntry {
    pub fn request(method: &'static str, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            direction: Direction::Request,
            method,
            url: url.into(),
            status: None,
            body: body.into(),
            at: Local::now(),
        }
    }

    pub fn response(
        method: &'static str,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self {
            direction: Direction::Response,
            method,
            url: url.into(),
            status: Some(status),
            body: body.into(),
            at: Local::now(),
        }
    }
}

impl TraceEntry {
    /// Response side of a request that never got an HTTP status.
    pub fn failure(method: &'static str, url: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            direction: Direction::Response,
            method,
            url: url.into(),
            status: None,
            body: error.to_string(),
            at: Local::now(),
        }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.at.format("%H:%M:%S");
        match self.direction {
            Direction::Request => write!(f, "[{time}] REQUEST {} {}", self.method, self.url)?,
            Direction::Response => match self.status {
                Some(status) => {
                    write!(f, "[{time}] RESPONSE [{status}] {} {}", self.method, self.url)?
                }
                None => write!(f, "[{time}] RESPONSE [failed] {} {}", self.method, self.url)?,
            },
        }
        if !self.body.is_empty() {
            write!(f, "\n{}", self.body)?;
        }
        Ok(())
    }
}

/// Destination for trace entries.
pub trait TraceSink: Send + Sync {
    fn record(&self, entry: TraceEntry);

    /// When false, callers may skip building entries altogether.
    fn enabled(&self) -> bool {
        true
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn record(&self, _entry: TraceEntry) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Bounded ring that drops the oldest entry once full.
#[derive(Debug)]
pub struct TraceRing {
    capacity: usize,
    entries: Mutex<VecDeque<TraceEntry>>,
}

impl TraceRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TraceRing {
    fn default() -> Self {
        Self::new(TRACE_CAPACITY)
    }
}

impl TraceSink for TraceRing {
    fn record(&self, entry: TraceEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

/// Pretty-print a JSON body; fall back to lossy UTF-8 for anything else.
pub fn pretty_body(bytes: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
