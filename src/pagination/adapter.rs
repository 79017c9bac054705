//! Binds a [`PaginationState`] and a [`DataSource`] to the task manager.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::arguments::Arguments;
use crate::error::TaskError;
use crate::events::EventHub;
use crate::pagination::events::{ListEvent, LoadOutcome};
use crate::pagination::source::{DataSource, PageRequest};
use crate::pagination::state::{LoadAction, LoadPlan, PageConfig, PaginationState, SharedItems};
use crate::task::{Task, TaskEvent, TaskId, TaskManager};

/// The single in-flight request of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTaskBinding {
    pub task_id: TaskId,
    pub action: LoadAction,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resets the list when a `load_data` future is dropped before its task
/// reported a terminal event.
struct LoadGuard<'a, S: DataSource> {
    adapter: &'a ApiBoundAdapter<S>,
    task_id: TaskId,
    armed: bool,
}

impl<S: DataSource> LoadGuard<'_, S> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<S: DataSource> Drop for LoadGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed && self.adapter.release(self.task_id) {
            self.adapter.tasks.cancel(self.task_id);
            debug!(task = %self.task_id, "list load abandoned by caller");
            self.adapter.reset_cancelled();
        }
    }
}

/// Paginated list driven by server tasks.
///
/// At most one task is in flight; a `load_data` call while one is running is
/// dropped by the state machine's phase guard.
pub struct ApiBoundAdapter<S: DataSource> {
    source: Arc<S>,
    tasks: TaskManager,
    state: Mutex<PaginationState<S::Item>>,
    items: SharedItems<S::Item>,
    arguments: Mutex<Arguments>,
    binding: Mutex<Option<ApiTaskBinding>>,
    events: EventHub<ListEvent>,
    tag: Option<String>,
}

impl<S: DataSource> ApiBoundAdapter<S> {
    pub fn new(source: Arc<S>, tasks: TaskManager, config: PageConfig) -> Self {
        let state = PaginationState::new(config);
        let items = state.items().clone();
        Self {
            source,
            tasks,
            state: Mutex::new(state),
            items,
            arguments: Mutex::new(Arguments::new()),
            binding: Mutex::new(None),
            events: EventHub::default(),
            tag: None,
        }
    }

    /// Tag handed to every page request; usually the owning screen's name.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Add an argument sent with every following page request.
    pub fn add_argument(&self, key: impl Into<String>, value: impl Into<Value>) {
        lock(&self.arguments).insert(key, value);
    }

    pub fn arguments(&self) -> Arguments {
        lock(&self.arguments).clone()
    }

    /// Subscribe to list events.
    pub fn events(&self) -> mpsc::UnboundedReceiver<ListEvent> {
        self.events.subscribe()
    }

    /// Shared handle to the list items.
    pub fn items(&self) -> SharedItems<S::Item> {
        self.items.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).is_loading()
    }

    pub fn has_no_more_from_server(&self) -> bool {
        lock(&self.state).has_no_more_from_server()
    }

    pub fn binding(&self) -> Option<ApiTaskBinding> {
        *lock(&self.binding)
    }

    /// Run one load cycle to completion.
    pub async fn load_data(&self, action: LoadAction) -> LoadOutcome {
        let request = match self.plan(action) {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        let dispatched = request.action;
        self.events.emit(ListEvent::LoadingStarted(dispatched));

        let mut handle = self.tasks.submit(self.source.create_task(&request));
        let task_id = handle.id();
        *lock(&self.binding) = Some(ApiTaskBinding {
            task_id,
            action: dispatched,
        });
        debug!(task = %task_id, action = ?dispatched, offset = request.offset, "page request dispatched");
        let guard = LoadGuard {
            adapter: self,
            task_id,
            armed: true,
        };

        let mut terminal = None;
        while let Some(event) = handle.next_event().await {
            match event {
                TaskEvent::Started => self.events.emit(ListEvent::TaskStarted),
                TaskEvent::Progress { total, current } => {
                    self.events.emit(ListEvent::TaskProgress { total, current })
                }
                other => {
                    terminal = Some(other);
                    break;
                }
            }
        }

        guard.disarm();

        if !self.release(task_id) {
            // `cancel` already reset the state and notified subscribers.
            return LoadOutcome::Cancelled;
        }

        // Cancelled from outside, e.g. by tag when the owning screen left.
        let cancelled = handle.is_cancelled();
        match terminal {
            Some(TaskEvent::Succeeded(output)) if !cancelled => self.apply(dispatched, &output),
            Some(TaskEvent::Failed(error)) if !cancelled => self.fail(error),
            _ => {
                debug!(task = %task_id, "list load cancelled by task manager");
                self.reset_cancelled();
                LoadOutcome::Cancelled
            }
        }
    }

    /// Cancel the in-flight request and any task carrying this list's tag.
    pub fn cancel(&self) {
        let binding = lock(&self.binding).take();
        if let Some(tag) = &self.tag {
            self.tasks.cancel_by_tag(tag);
        }
        if let Some(binding) = binding {
            self.tasks.cancel(binding.task_id);
            info!(task = %binding.task_id, "list load cancelled");
            self.reset_cancelled();
        }
    }

    /// Back to `Idle` after a cancelled load and tell subscribers.
    fn reset_cancelled(&self) {
        lock(&self.state).cancel();
        self.events.emit(ListEvent::LoadCancelled);
        self.events.emit(ListEvent::LoadingStopped {
            no_more_data: false,
        });
    }

    /// Run the state machine's entry step and build the server request.
    fn plan(&self, action: LoadAction) -> Result<PageRequest, LoadOutcome> {
        let mut state = lock(&self.state);
        let source = &self.source;
        let before = state.items().len();

        let plan = match state.begin_load(action, |offset, limit| source.fetch_local(offset, limit)) {
            Ok(plan) => plan,
            Err(error) => {
                drop(state);
                return Err(self.fail(error));
            }
        };

        let count = state.items().len();
        let changed = count != before;
        match plan {
            LoadPlan::Dropped => {
                debug!(action = ?action, "load dropped, task running");
                Err(LoadOutcome::Dropped)
            }
            LoadPlan::NoMoreData => {
                drop(state);
                self.events.emit(ListEvent::LoadingStopped { no_more_data: true });
                Err(LoadOutcome::NoMoreData)
            }
            LoadPlan::ServedFromCache => {
                drop(state);
                self.events.emit(ListEvent::ItemsChanged { count });
                self.events.emit(ListEvent::LoadingStopped {
                    no_more_data: false,
                });
                Err(LoadOutcome::ServedFromCache)
            }
            LoadPlan::Dispatch(dispatched) => {
                let config = *state.config();
                drop(state);
                if changed {
                    self.events.emit(ListEvent::ItemsChanged { count });
                }
                let (offset, limit) = match dispatched {
                    LoadAction::Refresh => (0, config.refresh_rows),
                    LoadAction::FetchMore => (count, config.fetch_more_rows),
                };
                Ok(PageRequest {
                    action: dispatched,
                    offset,
                    limit,
                    arguments: self.arguments(),
                    tag: self.tag.clone(),
                })
            }
        }
    }

    fn apply(&self, action: LoadAction, output: &<S::Task as Task>::Output) -> LoadOutcome {
        let items = match self.source.convert(output) {
            Ok(items) => items,
            Err(error) => return self.fail(error),
        };
        if let Err(error) = self.source.store(action, &items) {
            return self.fail(error);
        }
        let total = self.source.total(output);

        let (outcome, no_more_data) = match action {
            LoadAction::Refresh => {
                let reloaded = {
                    let state = lock(&self.state);
                    self.source.fetch_local(0, state.config().refresh_rows)
                };
                let reloaded = match reloaded {
                    Ok(reloaded) => reloaded,
                    Err(error) => return self.fail(error),
                };
                let mut state = lock(&self.state);
                let count = state.finish_refresh(reloaded);
                let no_more = state.has_no_more_from_server();
                drop(state);

                self.events.emit(ListEvent::ReloadCompleted { count });
                self.events.emit(ListEvent::RefreshFromServerFinished);
                (LoadOutcome::Refreshed { count }, no_more)
            }
            LoadAction::FetchMore => {
                let mut state = lock(&self.state);
                let count = state.finish_fetch_more(items);
                let no_more = state.has_no_more_from_server();
                let len = state.items().len();
                drop(state);

                self.events.emit(ListEvent::ItemsChanged { count: len });
                (LoadOutcome::FetchedMore { count }, no_more)
            }
        };

        if let Some(total) = total {
            self.events.emit(ListEvent::TotalReported(total));
        }
        self.events.emit(ListEvent::LoadingStopped { no_more_data });
        outcome
    }

    fn fail(&self, error: TaskError) -> LoadOutcome {
        lock(&self.state).fail();
        warn!(error = %error, "list load failed");
        self.events.emit(ListEvent::LoadFailed(error.to_string()));
        self.events.emit(ListEvent::LoadingStopped {
            no_more_data: false,
        });
        LoadOutcome::Failed(error)
    }

    /// Clear the binding if it still belongs to `task_id`.
    fn release(&self, task_id: TaskId) -> bool {
        let mut binding = lock(&self.binding);
        match *binding {
            Some(current) if current.task_id == task_id => {
                *binding = None;
                true
            }
            _ => false,
        }
    }
}
