//! Error context for enriched error information.
//!
//! Context records which operation failed, on which screen, and for which
//! task tag, so failures can be correlated in logs.

use chrono::{DateTime, Utc};

/// Context information attached to errors for debugging and recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Screen name if the error occurred while a specific screen was involved.
    pub screen: Option<String>,

    /// Task tag if the error came from a tagged task.
    pub task_tag: Option<String>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Number of retry attempts made before this error.
    pub retry_count: u32,

    /// Optional component/module where the error originated.
    pub component: Option<String>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            screen: None,
            task_tag: None,
            timestamp: Utc::now(),
            retry_count: 0,
            component: None,
        }
    }

    /// Set the screen name for this context.
    pub fn with_screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    /// Set the task tag for this context.
    pub fn with_task_tag(mut self, tag: impl Into<String>) -> Self {
        self.task_tag = Some(tag.into());
        self
    }

    /// Set the retry count for this context.
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set the component for this context.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Increment the retry count and return a new context.
    pub fn next_retry(&self) -> Self {
        Self {
            timestamp: Utc::now(),
            retry_count: self.retry_count + 1,
            ..self.clone()
        }
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref screen) = self.screen {
            parts.push(format!("screen={}", screen));
        }

        if let Some(ref tag) = self.task_tag {
            parts.push(format!("task_tag={}", tag));
        }

        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }

        if self.retry_count > 0 {
            parts.push(format!("retry_count={}", self.retry_count));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref screen) = self.screen {
            write!(f, " screen={}", screen)?;
        }

        if self.retry_count > 0 {
            write!(f, " retry={}", self.retry_count)?;
        }

        Ok(())
    }
}
