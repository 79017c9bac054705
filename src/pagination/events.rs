//! Outward list notifications.

use crate::error::TaskError;
use crate::pagination::state::LoadAction;

/// Notification sent to list subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    /// A server request was dispatched; show the loading indicator.
    LoadingStarted(LoadAction),
    /// The loading indicator should stop.
    LoadingStopped { no_more_data: bool },
    TaskStarted,
    TaskProgress { total: u64, current: u64 },
    /// Items were added or replaced; `count` is the new list length.
    ItemsChanged { count: usize },
    /// The list was re-read from the cache after a refresh.
    ReloadCompleted { count: usize },
    RefreshFromServerFinished,
    /// Total row count announced by the server.
    TotalReported(u64),
    LoadFailed(String),
    LoadCancelled,
}

/// Result of one `load_data` call.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A load was already running.
    Dropped,
    /// The server has no more rows.
    NoMoreData,
    /// A full page was served from the cache.
    ServedFromCache,
    Refreshed { count: usize },
    FetchedMore { count: usize },
    Failed(TaskError),
    Cancelled,
}

impl LoadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            LoadOutcome::ServedFromCache
                | LoadOutcome::Refreshed { .. }
                | LoadOutcome::FetchedMore { .. }
        )
    }
}
