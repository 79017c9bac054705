//! Data source capability for paginated lists.

use crate::arguments::Arguments;
use crate::error::TaskError;
use crate::pagination::state::LoadAction;
use crate::task::Task;

/// Parameters of one server page request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub action: LoadAction,
    /// Index of the first requested row.
    pub offset: usize,
    /// Requested page size.
    pub limit: usize,
    /// Arguments added to the adapter, merged over the source's own.
    pub arguments: Arguments,
    /// Tag the created task should carry so the list can cancel it.
    pub tag: Option<String>,
}

/// Everything a paginated list needs from the outside world.
///
/// A source reads pages from local storage, builds the server task for a
/// page, converts the task output into items and persists server pages.
pub trait DataSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;
    type Task: Task;

    /// Read up to `limit` cached items starting at `offset`.
    fn fetch_local(&self, offset: usize, limit: usize) -> Result<Vec<Self::Item>, TaskError>;

    /// Build the server task for `request`.
    fn create_task(&self, request: &PageRequest) -> Self::Task;

    /// Turn the task output into list items.
    fn convert(
        &self,
        output: &<Self::Task as Task>::Output,
    ) -> Result<Vec<Self::Item>, TaskError>;

    /// Persist a converted server page before the list reloads from the cache.
    fn store(&self, _action: LoadAction, _items: &[Self::Item]) -> Result<(), TaskError> {
        Ok(())
    }

    /// Total row count announced by the server, if the payload carries one.
    fn total(&self, _output: &<Self::Task as Task>::Output) -> Option<u64> {
        None
    }
}
