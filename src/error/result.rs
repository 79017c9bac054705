//! Result type alias for crate operations.

use super::context::ErrorContext;
use super::skeleton_error::SkeletonError;

/// Type alias for Results using SkeletonError.
pub type SkeletonResult<T> = Result<T, SkeletonError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> SkeletonResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> SkeletonResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<SkeletonError>,
{
    fn context(self, ctx: ErrorContext) -> SkeletonResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> SkeletonResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
