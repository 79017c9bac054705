//! Task execution error types.
//!
//! These are the failures an asynchronous task can report. They never cross
//! the adapter boundary as `Err`: list adapters turn them into a
//! `LoadFailed` event and reset their phase.

use thiserror::Error;

use crate::traits::HttpError;

/// Failure reported by a task run through the task manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The request never reached the server or the connection dropped.
    #[error("Network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server answered, but the payload could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Reading or writing the local cache failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The task was cancelled before it completed.
    #[error("Task cancelled")]
    Cancelled,

    /// Anything else.
    #[error("Task failed: {0}")]
    Other(String),
}

impl TaskError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            TaskError::Network(_) | TaskError::Timeout(_) => true,
            TaskError::Server { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            TaskError::InvalidResponse(_)
            | TaskError::Cache(_)
            | TaskError::Cancelled
            | TaskError::Other(_) => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            TaskError::Network(_) => {
                "Unable to reach the server. Please check your internet connection.".to_string()
            }
            TaskError::Timeout(_) => "The server took too long to respond.".to_string(),
            TaskError::Server { status, .. } => match *status {
                401 => "Authentication required. Please sign in again.".to_string(),
                403 => "Access denied.".to_string(),
                404 => "The requested data was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => "The server is experiencing issues. Please try again later.".to_string(),
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            TaskError::InvalidResponse(_) => "The server sent data in an unexpected format.".to_string(),
            TaskError::Cache(_) => "Cached data could not be read.".to_string(),
            TaskError::Cancelled => "The request was cancelled.".to_string(),
            TaskError::Other(message) => message.clone(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TaskError::Network(_) => "TASK_NETWORK",
            TaskError::Timeout(_) => "TASK_TIMEOUT",
            TaskError::Server { .. } => "TASK_SERVER",
            TaskError::InvalidResponse(_) => "TASK_INVALID_RESPONSE",
            TaskError::Cache(_) => "TASK_CACHE",
            TaskError::Cancelled => "TASK_CANCELLED",
            TaskError::Other(_) => "TASK_OTHER",
        }
    }
}

impl From<HttpError> for TaskError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ConnectionFailed(msg) | HttpError::Io(msg) => TaskError::Network(msg),
            HttpError::Timeout(msg) => TaskError::Timeout(msg),
            HttpError::ServerError { status, message } => TaskError::Server { status, message },
            HttpError::Cancelled => TaskError::Cancelled,
            HttpError::InvalidUrl(msg) | HttpError::Other(msg) => TaskError::Other(msg),
        }
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TaskError::Network("reset".into()).is_retryable());
        assert!(TaskError::Timeout("30s".into()).is_retryable());
        assert!(TaskError::Server {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!TaskError::Server {
            status: 404,
            message: "missing".into()
        }
        .is_retryable());
        assert!(!TaskError::Cancelled.is_retryable());
        assert!(!TaskError::InvalidResponse("bad".into()).is_retryable());
    }

    #[test]
    fn test_from_http_error() {
        assert_eq!(
            TaskError::from(HttpError::ServerError {
                status: 500,
                message: "boom".into()
            }),
            TaskError::Server {
                status: 500,
                message: "boom".into()
            }
        );
        assert_eq!(TaskError::from(HttpError::Cancelled), TaskError::Cancelled);
        assert_eq!(
            TaskError::from(HttpError::ConnectionFailed("refused".into())),
            TaskError::Network("refused".into())
        );
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(TaskError::from(json_err), TaskError::InvalidResponse(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(TaskError::Cancelled.to_string(), "Task cancelled");
        assert_eq!(
            TaskError::Server {
                status: 502,
                message: "bad gateway".into()
            }
            .to_string(),
            "Server error (502): bad gateway"
        );
    }
}
