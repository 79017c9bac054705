//! Load state machine for one paginated list.
//!
//! [`PaginationState::begin_load`] decides whether a load request is served
//! from the local cache, sent to the server or dropped; the `finish_*`
//! methods apply the server's answer. Nothing here performs I/O: local pages
//! come in through a fetch closure and server results are handed in by the
//! adapter.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TaskError;

/// Default page size for fetch-more requests.
pub const DEFAULT_FETCH_MORE_ROWS: usize = 10;

/// Default page size for refresh requests and the initial cache read.
pub const DEFAULT_REFRESH_ROWS: usize = 30;

/// Whether a load is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Refreshing,
    FetchingMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadAction {
    /// Reload the first page from the server.
    Refresh,
    /// Load the page after the current items.
    FetchMore,
}

/// How a fetch-more answer signals the end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfDataRule {
    /// Only an empty page ends the list.
    #[default]
    EmptyPage,
    /// A page shorter than `fetch_more_rows` ends the list.
    ShortPage,
}

/// Page sizes and end-of-data policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    pub fetch_more_rows: usize,
    pub refresh_rows: usize,
    #[serde(default)]
    pub end_of_data: EndOfDataRule,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            fetch_more_rows: DEFAULT_FETCH_MORE_ROWS,
            refresh_rows: DEFAULT_REFRESH_ROWS,
            end_of_data: EndOfDataRule::default(),
        }
    }
}

impl PageConfig {
    pub fn with_fetch_more_rows(mut self, rows: usize) -> Self {
        self.fetch_more_rows = rows;
        self
    }

    pub fn with_refresh_rows(mut self, rows: usize) -> Self {
        self.refresh_rows = rows;
        self
    }

    pub fn with_end_of_data(mut self, rule: EndOfDataRule) -> Self {
        self.end_of_data = rule;
        self
    }
}

/// What the caller must do after [`PaginationState::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPlan {
    /// A load is already running; nothing changed.
    Dropped,
    /// The server has no more rows; stop the loading indicator.
    NoMoreData,
    /// A full page came from the cache; no server request this round.
    ServedFromCache,
    /// Send the server request for this action.
    Dispatch(LoadAction),
}

/// List items shared between the state machine and readers.
///
/// Clones share the same storage.
#[derive(Debug)]
pub struct SharedItems<T> {
    inner: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for SharedItems<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedItems<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T> SharedItems<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn add(&self, item: T) {
        self.write().push(item);
    }

    /// Insert at `index`; returns `false` when `index > len`.
    pub fn insert(&self, index: usize, item: T) -> bool {
        let mut items = self.write();
        if index > items.len() {
            return false;
        }
        items.insert(index, item);
        true
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        let mut items = self.write();
        (index < items.len()).then(|| items.remove(index))
    }

    /// Remove the first item matching `predicate`.
    pub fn remove_if(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        let mut items = self.write();
        let position = items.iter().position(predicate)?;
        Some(items.remove(position))
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Prepend `data`, keeping its order.
    pub fn insert_data(&self, data: Vec<T>) {
        if data.is_empty() {
            return;
        }
        let mut items = self.write();
        items.splice(0..0, data);
    }

    pub fn append_data(&self, data: Vec<T>) {
        self.write().extend(data);
    }

    /// Replace the whole list.
    pub fn replace(&self, data: Vec<T>) {
        *self.write() = data;
    }
}

impl<T: Clone> SharedItems<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        self.read().get(index).cloned()
    }

    /// Copy of the current list.
    pub fn snapshot(&self) -> Vec<T> {
        self.read().clone()
    }
}

impl<T: PartialEq> SharedItems<T> {
    /// Remove the first item equal to `item`.
    pub fn remove_item(&self, item: &T) -> bool {
        self.remove_if(|candidate| candidate == item).is_some()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.read().contains(item)
    }
}

/// Per-list load state.
#[derive(Debug)]
pub struct PaginationState<T> {
    phase: LoadPhase,
    action: Option<LoadAction>,
    initialized: bool,
    no_more_from_server: bool,
    items: SharedItems<T>,
    config: PageConfig,
}

impl<T> PaginationState<T> {
    pub fn new(config: PageConfig) -> Self {
        Self {
            phase: LoadPhase::Idle,
            action: None,
            initialized: false,
            no_more_from_server: false,
            items: SharedItems::new(),
            config,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase != LoadPhase::Idle
    }

    /// Action of the running load, if any.
    pub fn action(&self) -> Option<LoadAction> {
        self.action
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn has_no_more_from_server(&self) -> bool {
        self.no_more_from_server
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn items(&self) -> &SharedItems<T> {
        &self.items
    }

    /// Decide how to serve `action`.
    ///
    /// `fetch_local(offset, limit)` reads a page from the local cache. A cache
    /// error leaves the phase `Idle`.
    pub fn begin_load<F>(&mut self, action: LoadAction, mut fetch_local: F) -> Result<LoadPlan, TaskError>
    where
        F: FnMut(usize, usize) -> Result<Vec<T>, TaskError>,
    {
        if self.is_loading() {
            debug!(phase = ?self.phase, "load already running, request dropped");
            return Ok(LoadPlan::Dropped);
        }

        let mut action = action;
        if action == LoadAction::Refresh {
            self.no_more_from_server = false;
        }

        if action == LoadAction::FetchMore && self.no_more_from_server {
            return Ok(LoadPlan::NoMoreData);
        }

        if !self.initialized {
            let cached = fetch_local(0, self.config.refresh_rows)?;
            debug!(count = cached.len(), "delivering cached items before refresh");
            self.items.replace(cached);
            self.initialized = true;
        }

        if self.items.is_empty() {
            action = LoadAction::Refresh;
        }

        match action {
            LoadAction::Refresh => {
                self.enter(LoadPhase::Refreshing, action);
                Ok(LoadPlan::Dispatch(LoadAction::Refresh))
            }
            LoadAction::FetchMore => {
                let page = fetch_local(self.items.len(), self.config.fetch_more_rows)?;
                let full_page = page.len() >= self.config.fetch_more_rows;
                if !page.is_empty() {
                    debug!(count = page.len(), "fetched more from cache");
                    self.items.append_data(page);
                }
                if full_page {
                    return Ok(LoadPlan::ServedFromCache);
                }
                self.enter(LoadPhase::FetchingMore, action);
                Ok(LoadPlan::Dispatch(LoadAction::FetchMore))
            }
        }
    }

    /// Apply a successful refresh. `reloaded` is the first page re-read from
    /// the cache after the server result was stored.
    pub fn finish_refresh(&mut self, reloaded: Vec<T>) -> usize {
        let count = reloaded.len();
        self.items.replace(reloaded);
        self.no_more_from_server = count < self.config.refresh_rows;
        self.leave();
        count
    }

    /// Apply a successful fetch-more with the converted server page.
    pub fn finish_fetch_more(&mut self, fetched: Vec<T>) -> usize {
        let count = fetched.len();
        self.no_more_from_server = match self.config.end_of_data {
            EndOfDataRule::EmptyPage => count == 0,
            EndOfDataRule::ShortPage => count < self.config.fetch_more_rows,
        };
        self.items.append_data(fetched);
        self.leave();
        count
    }

    /// The server request failed; back to `Idle` without touching data.
    pub fn fail(&mut self) {
        self.leave();
    }

    /// The server request was cancelled; back to `Idle` without touching data.
    pub fn cancel(&mut self) {
        self.leave();
    }

    fn enter(&mut self, phase: LoadPhase, action: LoadAction) {
        debug!(from = ?self.phase, to = ?phase, "load phase change");
        self.phase = phase;
        self.action = Some(action);
    }

    fn leave(&mut self) {
        debug!(from = ?self.phase, "load phase back to idle");
        self.phase = LoadPhase::Idle;
        self.action = None;
    }
}

impl<T> Default for PaginationState<T> {
    fn default() -> Self {
        Self::new(PageConfig::default())
    }
}
