//! Navigation error types.
//!
//! Every variant here is a programmer error: the navigator returns it
//! immediately and leaves its stack untouched.

use std::fmt;

/// Errors raised by the screen registry and the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// No screen is registered under this name.
    ScreenNotFound { name: String },

    /// The navigator was asked to do something its current state forbids.
    InvalidState { operation: String, message: String },
}

impl NavigationError {
    /// Shorthand for [`NavigationError::ScreenNotFound`].
    pub fn not_found(name: impl Into<String>) -> Self {
        NavigationError::ScreenNotFound { name: name.into() }
    }

    /// Shorthand for [`NavigationError::InvalidState`].
    pub fn invalid_state(operation: impl Into<String>, message: impl Into<String>) -> Self {
        NavigationError::InvalidState {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NavigationError::ScreenNotFound { name } => {
                format!("The screen '{}' is not available.", name)
            }
            NavigationError::InvalidState { .. } => {
                "Navigation failed because the application is in an unexpected state.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NavigationError::ScreenNotFound { .. } => "NAV_NOT_FOUND",
            NavigationError::InvalidState { .. } => "NAV_INVALID_STATE",
        }
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::ScreenNotFound { name } => {
                write!(f, "Screen not registered: {}", name)
            }
            NavigationError::InvalidState { operation, message } => {
                write!(f, "Invalid navigation state in {}: {}", operation, message)
            }
        }
    }
}

impl std::error::Error for NavigationError {}
