//! Classify failed remote calls for retry decisions.

use super::error::RemoteError;

/// Retry classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 4xx or a local failure: retrying cannot help.
    TerminalClient,
    /// 5xx or a transport failure: plausibly transient on the server/network side.
    RetryableServer,
    /// The artifact is not materialized yet although the job reports completion.
    RetryableTransient,
}

/// Classify an HTTP status code.
pub fn classify_http_status(code: u16) -> FailureClass {
    match code {
        400..=499 => FailureClass::TerminalClient,
        _ => FailureClass::RetryableServer,
    }
}

/// Classify a curl error. Misconfigured URLs are terminal; everything else on
/// the wire is treated as a server/network hiccup.
pub fn classify_curl_error(e: &curl::Error) -> FailureClass {
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return FailureClass::TerminalClient;
    }
    FailureClass::RetryableServer
}

/// Classify a failure from the create/status/delete endpoints.
pub fn classify(e: &RemoteError) -> FailureClass {
    match e {
        RemoteError::Transport(ce) => classify_curl_error(ce),
        RemoteError::Http { status, .. } => classify_http_status(*status),
        RemoteError::Decode(_) => FailureClass::RetryableServer,
        RemoteError::Form(_) | RemoteError::Storage(_) => FailureClass::TerminalClient,
    }
}

/// Classify a failure from the artifact content endpoint.
///
/// The content endpoint answers 404 until the file is materialized. When a
/// response carries no such status, a "not ready" message is the fallback
/// signal. Anything else classifies as on the other endpoints.
pub fn classify_content(e: &RemoteError) -> FailureClass {
    match e {
        RemoteError::Http { status: 404, .. } => FailureClass::RetryableTransient,
        RemoteError::Http { message, .. } if says_not_ready(message) => {
            FailureClass::RetryableTransient
        }
        other => classify(other),
    }
}

fn says_not_ready(message: &str) -> bool {
    message.to_ascii_lowercase().contains("not ready")
}
