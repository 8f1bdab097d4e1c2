//! Error types for booth backend calls.

use thiserror::Error;

/// Result type for booth client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur when talking to the booth backend.
///
/// Transport and parse failures inside `submit`, `poll_once` and `refresh`
/// are folded into [`Submission`](Self::Submission),
/// [`StatusFetch`](Self::StatusFetch) and [`Refresh`](Self::Refresh) at the
/// operation boundary; the remaining variants come from setup and helpers.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API base URL is invalid.
    #[error("invalid booth API URL: {0}")]
    InvalidUrl(String),
    /// Job creation failed. Surfaced to the visitor, never retried.
    #[error("failed to create generation job: {0}")]
    Submission(String),
    /// Both the primary and the hash lookup failed. Polling continues.
    #[error("failed to fetch generation status: {0}")]
    StatusFetch(String),
    /// Gallery fetch failed. Previous images stay visible.
    #[error("failed to fetch gallery images: {0}")]
    Refresh(String),
    /// The backend answered with a non-success status.
    #[error("{path} returned HTTP {status}")]
    UnexpectedStatus {
        /// API path that was requested.
        path: String,
        /// HTTP status code.
        status: u16,
    },
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("booth API HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON parsing failed.
    #[error("failed to parse booth API payload: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading a local photo failed.
    #[error("failed to read photo: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Returns true if a fixed-interval loop will simply try again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StatusFetch(_) | Self::Refresh(_) | Self::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_errors_are_retryable() {
        assert!(ClientError::StatusFetch("404".into()).is_retryable());
        assert!(ClientError::Refresh("500".into()).is_retryable());
        assert!(!ClientError::Submission("500".into()).is_retryable());
        assert!(!ClientError::InvalidUrl("bad".into()).is_retryable());
    }

    #[test]
    fn unexpected_status_names_the_path() {
        let err = ClientError::UnexpectedStatus {
            path: "/api/rooms/main/jobs/gallery".into(),
            status: 503,
        };
        assert_eq!(err.to_string(), "/api/rooms/main/jobs/gallery returned HTTP 503");
        assert!(!err.is_retryable());
    }

    #[test]
    fn messages_name_the_operation() {
        let err = ClientError::Submission("HTTP 500".into());
        assert_eq!(err.to_string(), "failed to create generation job: HTTP 500");
    }
}
