//! Error types for the summarize pipeline.
//!
//! Every failure a request can hit is one variant of [`SummarizeError`].  The
//! HTTP layer turns each of them into the JSON error envelope, so nothing here
//! knows about status codes.

use thiserror::Error;

/// Coarse classification of a [`SummarizeError`], used for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoContent,
    UpstreamError,
    MalformedUpstreamResponse,
    TransportError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoContent => "no_content",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::MalformedUpstreamResponse => "malformed_upstream_response",
            ErrorKind::TransportError => "transport_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The request carried no recognised content shape, or only blank text.
    #[error("no content provided")]
    NoContent,

    /// The completion API answered with a non-success status.
    #[error("completion API returned status {status}")]
    Upstream { status: u16, body: String },

    /// The completion API answered 2xx but without `choices[0].message.content`.
    #[error("malformed completion response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("failed to reach completion API: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SummarizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SummarizeError::NoContent => ErrorKind::NoContent,
            SummarizeError::Upstream { .. } => ErrorKind::UpstreamError,
            SummarizeError::MalformedUpstreamResponse(_) => ErrorKind::MalformedUpstreamResponse,
            SummarizeError::Transport(_) => ErrorKind::TransportError,
        }
    }

    /// Diagnostic text for the `details` field of the error envelope.  For an
    /// upstream failure this is the raw response body, untouched.
    pub fn details(&self) -> Option<String> {
        match self {
            SummarizeError::NoContent => None,
            SummarizeError::Upstream { body, .. } => Some(body.clone()),
            SummarizeError::MalformedUpstreamResponse(detail) => Some(detail.clone()),
            SummarizeError::Transport(err) => Some(err.to_string()),
        }
    }
}
