//! Skeleton - breadcrumb screen navigation and paginated, API-bound lists.
//!
//! - [`navigation`]: the [`navigation::FragmentNavigator`] breadcrumb stack
//!   with the detour-and-resume interception protocol
//! - [`pagination`]: the list load state machine, [`pagination::DataSource`]
//!   and the adapters binding lists to background tasks
//! - [`task`]: tokio task execution with tag-based cancellation
//! - [`update`]: version checks and update downloads
//!
//! Platform collaborators (screen host, screen registry, HTTP, local cache)
//! are traits in [`traits`]; [`adapters`] holds the concrete and mock ones.

pub mod adapters;
pub mod arguments;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod navigation;
pub mod pagination;
pub mod task;
pub mod traits;
pub mod update;

pub use arguments::Arguments;
pub use config::{SkeletonConfig, UpdaterConfig};
pub use error::{ErrorCategory, NavigationError, SkeletonError, SkeletonResult, TaskError};
pub use navigation::{FragmentNavigator, NavigationOutcome};
pub use pagination::{ApiBoundAdapter, DataSource, LoadAction, PageConfig, PaginationState};
pub use task::{Task, TaskManager};
