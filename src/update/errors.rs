//! Error type for update checks and downloads.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::ErrorCategory;
use crate::traits::HttpError;

/// Failure of an update operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The version document could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to {operation} {}: {message}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        message: String,
    },

    /// `download_update` was called without a recorded pending update.
    #[error("No pending update to download")]
    NoPendingUpdate,

    /// A check or download is already running.
    #[error("An update operation is already running")]
    AlreadyRunning,

    #[error("Downloaded file is empty")]
    EmptyDownload,

    #[error("Update operation cancelled")]
    Cancelled,
}

impl UpdateError {
    pub fn io(operation: impl Into<String>, path: &Path, err: std::io::Error) -> Self {
        UpdateError::Io {
            operation: operation.into(),
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            UpdateError::Network(_) | UpdateError::Timeout(_) => ErrorCategory::Network,
            UpdateError::Server { .. }
            | UpdateError::InvalidResponse(_)
            | UpdateError::EmptyDownload => ErrorCategory::Server,
            UpdateError::Io { .. } => ErrorCategory::Storage,
            UpdateError::NoPendingUpdate | UpdateError::AlreadyRunning => ErrorCategory::Client,
            UpdateError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            UpdateError::Network(_) | UpdateError::Timeout(_) | UpdateError::EmptyDownload => true,
            UpdateError::Server { status, .. } => *status >= 500 || *status == 429,
            UpdateError::InvalidResponse(_)
            | UpdateError::Io { .. }
            | UpdateError::NoPendingUpdate
            | UpdateError::AlreadyRunning
            | UpdateError::Cancelled => false,
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            UpdateError::Network(_) => {
                "Unable to reach the update server. Please check your internet connection."
                    .to_string()
            }
            UpdateError::Timeout(_) => "The update server took too long to respond.".to_string(),
            UpdateError::Server { status, .. } => match *status {
                404 => "No update information is available.".to_string(),
                500..=599 => {
                    "The update server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!("The update server returned an error (HTTP {}).", status),
            },
            UpdateError::InvalidResponse(_) => {
                "The update server sent an unexpected response.".to_string()
            }
            UpdateError::Io { path, .. } => {
                format!("Could not write the update to {}.", path.display())
            }
            UpdateError::NoPendingUpdate => "There is no update to download.".to_string(),
            UpdateError::AlreadyRunning => "An update check is already in progress.".to_string(),
            UpdateError::EmptyDownload => "The downloaded update was empty.".to_string(),
            UpdateError::Cancelled => "The update was cancelled.".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            UpdateError::Network(_) => "UPDATE_NETWORK",
            UpdateError::Timeout(_) => "UPDATE_TIMEOUT",
            UpdateError::Server { .. } => "UPDATE_SERVER",
            UpdateError::InvalidResponse(_) => "UPDATE_INVALID_RESPONSE",
            UpdateError::Io { .. } => "UPDATE_IO",
            UpdateError::NoPendingUpdate => "UPDATE_NO_PENDING",
            UpdateError::AlreadyRunning => "UPDATE_ALREADY_RUNNING",
            UpdateError::EmptyDownload => "UPDATE_EMPTY_DOWNLOAD",
            UpdateError::Cancelled => "UPDATE_CANCELLED",
        }
    }
}

impl From<HttpError> for UpdateError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ConnectionFailed(msg) | HttpError::Io(msg) => UpdateError::Network(msg),
            HttpError::Timeout(msg) => UpdateError::Timeout(msg),
            HttpError::ServerError { status, message } => UpdateError::Server { status, message },
            HttpError::Cancelled => UpdateError::Cancelled,
            HttpError::InvalidUrl(msg) | HttpError::Other(msg) => UpdateError::Network(msg),
        }
    }
}

impl From<serde_json::Error> for UpdateError {
    fn from(err: serde_json::Error) -> Self {
        UpdateError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_errors_convert() {
        assert_eq!(
            UpdateError::from(HttpError::ConnectionFailed("refused".into())),
            UpdateError::Network("refused".into())
        );
        assert_eq!(
            UpdateError::from(HttpError::ServerError {
                status: 502,
                message: "bad gateway".into()
            }),
            UpdateError::Server {
                status: 502,
                message: "bad gateway".into()
            }
        );
        assert_eq!(UpdateError::from(HttpError::Cancelled), UpdateError::Cancelled);
    }

    #[test]
    fn test_categories_and_retry() {
        assert_eq!(UpdateError::Network("x".into()).category(), ErrorCategory::Network);
        assert!(UpdateError::Network("x".into()).is_retryable());
        assert!(!UpdateError::InvalidResponse("x".into()).is_retryable());
        assert!(!UpdateError::NoPendingUpdate.is_retryable());
        assert!(!UpdateError::Server {
            status: 404,
            message: String::new()
        }
        .is_retryable());

        let io = UpdateError::io(
            "write",
            Path::new("/tmp/x.bin"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io.category(), ErrorCategory::Storage);
        assert_eq!(io.to_string(), "Failed to write /tmp/x.bin: denied");
        assert_eq!(io.error_code(), "UPDATE_IO");
    }
}
