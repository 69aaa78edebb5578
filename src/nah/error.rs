//! Error types for NahCloud API calls.

use thiserror::Error;

/// Result alias used by every client operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`NahClient`](super::client::NahClient) operations.
///
/// The variants separate "could not reach the service" (transport, timeout,
/// cancellation) from "the service rejected the request" (API) and from
/// local failures that happen before anything is sent.
#[derive(Debug, Error)]
pub enum Error {
    /// No HTTP response was received (DNS, connection refused, broken body).
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The per-request timeout elapsed before a response arrived.
    #[error("Request timed out")]
    Timeout,

    /// The caller's cancellation token fired while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    /// The server answered with a status code of 400 or above.
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// The outgoing payload could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A success response carried a body that is not the expected JSON.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Structural validation failed; no request was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The configured endpoint is not an absolute URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl Error {
    /// True when no HTTP response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout | Self::Cancelled)
    }

    /// HTTP status code for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for an API error with status 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}
