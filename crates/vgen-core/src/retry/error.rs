//! Error returned by a single remote call.

use thiserror::Error;

/// Failure of one call against the video service.
///
/// Kept separate from workflow errors so the classifier can decide retries
/// before the failure is folded into a stage outcome.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Curl reported a transport failure (connect, timeout, reset, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// The multipart body could not be assembled.
    #[error("building form: {0}")]
    Form(#[from] curl::FormError),
    /// The service answered with a non-success status.
    #[error("API error ({status}{}): {message}", type_suffix(.error_type))]
    Http {
        status: u16,
        message: String,
        error_type: Option<String>,
    },
    /// A success response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Local disk failure while persisting a download.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

fn type_suffix(error_type: &Option<String>) -> String {
    error_type
        .as_deref()
        .map(|t| format!(" - {t}"))
        .unwrap_or_default()
}

impl RemoteError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        RemoteError::Http {
            status,
            message: message.into(),
            error_type: None,
        }
    }

    /// HTTP status, when the service produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The underlying message without the status prefix.
    pub fn message(&self) -> String {
        match self {
            RemoteError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
