//! Non-paginated list: one request replaces the whole list.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::arguments::Arguments;
use crate::error::TaskError;
use crate::events::EventHub;
use crate::pagination::events::{ListEvent, LoadOutcome};
use crate::pagination::state::SharedItems;
use crate::task::{Task, TaskEvent, TaskId, TaskManager};

type TaskFactory<K> = Box<dyn Fn(&Arguments) -> K + Send + Sync>;
type Converter<T, O> = Box<dyn Fn(&O) -> Result<Vec<T>, TaskError> + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// List filled by a single task whose output replaces all items.
pub struct SimpleApiAdapter<T, K: Task> {
    tasks: TaskManager,
    factory: TaskFactory<K>,
    convert: Converter<T, K::Output>,
    items: SharedItems<T>,
    arguments: Mutex<Arguments>,
    running: Mutex<Option<TaskId>>,
    events: EventHub<ListEvent>,
}

impl<T, K> SimpleApiAdapter<T, K>
where
    T: Clone + Send + Sync + 'static,
    K: Task,
{
    /// `factory` builds the task from the current arguments on every load.
    pub fn new(
        tasks: TaskManager,
        factory: impl Fn(&Arguments) -> K + Send + Sync + 'static,
        convert: impl Fn(&K::Output) -> Result<Vec<T>, TaskError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            tasks,
            factory: Box::new(factory),
            convert: Box::new(convert),
            items: SharedItems::new(),
            arguments: Mutex::new(Arguments::new()),
            running: Mutex::new(None),
            events: EventHub::default(),
        }
    }

    pub fn add_argument(&self, key: impl Into<String>, value: impl Into<Value>) {
        lock(&self.arguments).insert(key, value);
    }

    pub fn events(&self) -> mpsc::UnboundedReceiver<ListEvent> {
        self.events.subscribe()
    }

    pub fn items(&self) -> SharedItems<T> {
        self.items.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.running).is_some()
    }

    /// Run the task and replace the items with its converted output.
    pub async fn load_data(&self) -> LoadOutcome {
        let mut handle = {
            let mut running = lock(&self.running);
            if running.is_some() {
                debug!("simple list load dropped, task running");
                return LoadOutcome::Dropped;
            }
            let arguments = lock(&self.arguments).clone();
            let handle = self.tasks.submit((self.factory)(&arguments));
            *running = Some(handle.id());
            handle
        };
        let task_id = handle.id();

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

        let owned = {
            let mut running = lock(&self.running);
            let owned = *running == Some(task_id);
            if owned {
                *running = None;
            }
            owned
        };
        if !owned || handle.is_cancelled() {
            return LoadOutcome::Cancelled;
        }

        match terminal {
            Some(TaskEvent::Succeeded(output)) => match (self.convert)(&output) {
                Ok(items) => {
                    let count = items.len();
                    self.items.replace(items);
                    self.events.emit(ListEvent::ItemsChanged { count });
                    self.events.emit(ListEvent::ReloadCompleted { count });
                    LoadOutcome::Refreshed { count }
                }
                Err(error) => self.fail(error),
            },
            Some(TaskEvent::Failed(error)) => self.fail(error),
            _ => {
                self.events.emit(ListEvent::LoadCancelled);
                LoadOutcome::Cancelled
            }
        }
    }

    /// Cancel the running task, if any.
    pub fn cancel(&self) {
        if let Some(task_id) = lock(&self.running).take() {
            self.tasks.cancel(task_id);
            self.events.emit(ListEvent::LoadCancelled);
        }
    }

    fn fail(&self, error: TaskError) -> LoadOutcome {
        warn!(error = %error, "simple list load failed");
        self.events.emit(ListEvent::LoadFailed(error.to_string()));
        LoadOutcome::Failed(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::ScriptedTask;
    use std::sync::Arc;
    use std::time::Duration;

    fn echo(output: &Vec<u32>) -> Result<Vec<u32>, TaskError> {
        Ok(output.clone())
    }

    #[tokio::test]
    async fn test_load_replaces_items() {
        let adapter = SimpleApiAdapter::new(
            TaskManager::new(),
            |_args: &Arguments| ScriptedTask::ok(vec![1u32, 2, 3]),
            echo,
        );
        adapter.items().append_data(vec![9, 9]);
        let mut rx = adapter.events();

        assert_eq!(adapter.load_data().await, LoadOutcome::Refreshed { count: 3 });
        assert_eq!(adapter.items().snapshot(), vec![1, 2, 3]);
        assert_eq!(rx.recv().await, Some(ListEvent::TaskStarted));
    }

    #[tokio::test]
    async fn test_factory_sees_arguments() {
        let seen = Arc::new(Mutex::new(None));
        let adapter = {
            let seen = Arc::clone(&seen);
            SimpleApiAdapter::new(
                TaskManager::new(),
                move |args: &Arguments| {
                    *seen.lock().unwrap() = args.get_i64("page");
                    ScriptedTask::ok(Vec::<u32>::new())
                },
                echo,
            )
        };
        adapter.add_argument("page", 4);

        adapter.load_data().await;
        assert_eq!(*seen.lock().unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_failure_keeps_items() {
        let adapter = SimpleApiAdapter::new(
            TaskManager::new(),
            |_args: &Arguments| ScriptedTask::<Vec<u32>>::err(TaskError::Timeout("slow".into())),
            echo,
        );
        adapter.items().add(5);

        let outcome = adapter.load_data().await;
        assert_eq!(outcome, LoadOutcome::Failed(TaskError::Timeout("slow".into())));
        assert_eq!(adapter.items().snapshot(), vec![5]);
        assert!(!adapter.is_loading());
    }

    #[tokio::test]
    async fn test_concurrent_load_dropped() {
        let adapter = SimpleApiAdapter::new(
            TaskManager::new(),
            |_args: &Arguments| ScriptedTask::ok(vec![1u32]).with_delay(Duration::from_millis(20)),
            echo,
        );

        let (first, second) = tokio::join!(adapter.load_data(), adapter.load_data());
        assert_eq!(first, LoadOutcome::Refreshed { count: 1 });
        assert_eq!(second, LoadOutcome::Dropped);
    }
}
