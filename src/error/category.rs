//! Error category classification for unified error handling.
//!
//! Categories let callers decide between "raise", "retry later" and "tell the
//! user" without matching on every concrete error variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (connection, DNS, timeout).
    /// Generally transient and retryable.
    Network,

    /// Backend/server-side errors (HTTP 5xx, malformed payloads).
    Server,

    /// Programmer errors: unknown screen names, invalid navigation state.
    /// Not retryable.
    Client,

    /// Local storage and filesystem errors.
    Storage,

    /// Work that was cancelled before it completed.
    Cancelled,

    /// Configuration errors (missing settings, invalid values).
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns true if errors in this category indicate a bug in the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorCategory::Client)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Storage => "storage",
            ErrorCategory::Cancelled => "cancelled",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Server => "Server-side issue",
            ErrorCategory::Client => "Application error",
            ErrorCategory::Storage => "Local storage problem",
            ErrorCategory::Cancelled => "Operation cancelled",
            ErrorCategory::Configuration => "Configuration problem",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your internet connection and try again",
            ErrorCategory::Server => {
                "The server may be experiencing issues. Please try again later"
            }
            ErrorCategory::Client => "This may be a bug. Please report this issue if it persists",
            ErrorCategory::Storage => "Check file permissions and available disk space",
            ErrorCategory::Cancelled => "Start the operation again when ready",
            ErrorCategory::Configuration => "Check your configuration settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
