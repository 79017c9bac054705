//! Local cache abstraction for paginated lists.

use crate::error::TaskError;

/// Page-addressable local storage.
///
/// The list state machine reads pages synchronously; writes happen after a
/// server page arrives and before the list reloads from the cache.
pub trait LocalCache<T>: Send + Sync {
    /// Read up to `limit` items starting at `offset`, in display order.
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<T>, TaskError>;

    /// Replace the cached contents with a fresh first page.
    fn replace_all(&self, items: &[T]) -> Result<(), TaskError>;

    /// Append a page after the cached contents.
    fn append(&self, items: &[T]) -> Result<(), TaskError>;

    /// Number of cached items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
