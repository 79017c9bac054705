//! In-memory [`LocalCache`] implementation.

use std::sync::{PoisonError, RwLock};

use crate::error::TaskError;
use crate::traits::LocalCache;

/// Vector-backed page cache.
#[derive(Debug)]
pub struct InMemoryCache<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> Default for InMemoryCache<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T> InMemoryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-filled with `rows`.
    pub fn with_rows(rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }
}

impl<T: Clone + Send + Sync> LocalCache<T> for InMemoryCache<T> {
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<T>, TaskError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.iter().skip(offset).take(limit).cloned().collect())
    }

    fn replace_all(&self, items: &[T]) -> Result<(), TaskError> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        *rows = items.to_vec();
        Ok(())
    }

    fn append(&self, items: &[T]) -> Result<(), TaskError> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        rows.extend_from_slice(items);
        Ok(())
    }

    fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
