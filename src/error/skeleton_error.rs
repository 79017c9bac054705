//! Unified error type for the crate.
//!
//! `SkeletonError` folds the domain errors (navigation, task, update, I/O)
//! into one enum with shared categorization and user messaging.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::navigation::NavigationError;
use super::task::TaskError;
use crate::update::UpdateError;

/// Unified error type.
#[derive(Debug)]
pub enum SkeletonError {
    /// Screen registry and navigator errors.
    Navigation(NavigationError),

    /// Asynchronous task failures.
    Task(TaskError),

    /// Update check/download failures.
    Update(UpdateError),

    /// Filesystem errors outside the update flow.
    Io(std::io::Error),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<SkeletonError>,
        context: ErrorContext,
    },
}

impl SkeletonError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SkeletonError::Navigation(_) => ErrorCategory::Client,
            SkeletonError::Task(err) => match err {
                TaskError::Network(_) | TaskError::Timeout(_) => ErrorCategory::Network,
                TaskError::Server { .. } | TaskError::InvalidResponse(_) => ErrorCategory::Server,
                TaskError::Cache(_) => ErrorCategory::Storage,
                TaskError::Cancelled => ErrorCategory::Cancelled,
                TaskError::Other(_) => ErrorCategory::Client,
            },
            SkeletonError::Update(err) => err.category(),
            SkeletonError::Io(_) => ErrorCategory::Storage,
            SkeletonError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            SkeletonError::Navigation(_) => false,
            SkeletonError::Task(err) => err.is_retryable(),
            SkeletonError::Update(err) => err.is_retryable(),
            SkeletonError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock
            ),
            SkeletonError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SkeletonError::Navigation(err) => err.user_message(),
            SkeletonError::Task(err) => err.user_message(),
            SkeletonError::Update(err) => err.user_message(),
            SkeletonError::Io(err) => format!("A file operation failed: {}", err),
            SkeletonError::WithContext { error, context } => {
                format!("{}\n\nContext: {}", error.user_message(), context)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SkeletonError::Navigation(err) => err.error_code(),
            SkeletonError::Task(err) => err.error_code(),
            SkeletonError::Update(err) => err.error_code(),
            SkeletonError::Io(_) => "IO_ERROR",
            SkeletonError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        SkeletonError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SkeletonError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &SkeletonError {
        match self {
            SkeletonError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for SkeletonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkeletonError::Navigation(err) => write!(f, "{}", err),
            SkeletonError::Task(err) => write!(f, "{}", err),
            SkeletonError::Update(err) => write!(f, "{}", err),
            SkeletonError::Io(err) => write!(f, "I/O error: {}", err),
            SkeletonError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for SkeletonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SkeletonError::Navigation(err) => Some(err),
            SkeletonError::Task(err) => Some(err),
            SkeletonError::Update(err) => Some(err),
            SkeletonError::Io(err) => Some(err),
            SkeletonError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<NavigationError> for SkeletonError {
    fn from(err: NavigationError) -> Self {
        SkeletonError::Navigation(err)
    }
}

impl From<TaskError> for SkeletonError {
    fn from(err: TaskError) -> Self {
        SkeletonError::Task(err)
    }
}

impl From<UpdateError> for SkeletonError {
    fn from(err: UpdateError) -> Self {
        SkeletonError::Update(err)
    }
}

impl From<std::io::Error> for SkeletonError {
    fn from(err: std::io::Error) -> Self {
        SkeletonError::Io(err)
    }
}

impl From<serde_json::Error> for SkeletonError {
    fn from(err: serde_json::Error) -> Self {
        SkeletonError::Task(TaskError::from(err))
    }
}
