//! Unified error handling.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain errors**: navigation, task and update failures
//! - **Unified type**: `SkeletonError` consolidates all of them
//! - **Context**: operation, screen and task tag attached for debugging
//!
//! # Error Categories
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, DNS, timeout | Yes |
//! | Server | Backend errors, bad payloads | Yes |
//! | Client | Unknown screen, invalid state | No |
//! | Storage | Cache and filesystem errors | No |
//! | Cancelled | Work cancelled by tag | No |
//! | Configuration | Config issues | No |
//!
//! Navigation errors are programmer errors and are returned at once. Task
//! errors are caught at the list adapter boundary and surface as events.

mod category;
mod context;
mod navigation;
mod result;
mod skeleton_error;
mod task;

pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use navigation::NavigationError;
pub use result::{ResultExt, SkeletonResult};
pub use skeleton_error::SkeletonError;
pub use task::TaskError;
