//! Tokio-backed task executor with cancellation by tag.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;
use uuid::Uuid;

use crate::error::TaskError;
use crate::task::{ProgressSink, Task, TaskEvent};

/// Identifier of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct RunningTask {
    tag: Option<String>,
    abort: AbortHandle,
    cancelled: Arc<AtomicBool>,
    notify_cancelled: Box<dyn FnOnce() + Send>,
}

impl RunningTask {
    fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.abort.abort();
        (self.notify_cancelled)();
    }
}

type Registry = Arc<Mutex<HashMap<TaskId, RunningTask>>>;

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<TaskId, RunningTask>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Spawns tasks and tracks them until they finish.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone, Default)]
pub struct TaskManager {
    running: Registry,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the current tokio runtime.
    pub fn submit<K: Task>(&self, task: K) -> TaskHandle<K::Output> {
        let id = TaskId::new();
        let tag = task.tag();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        let progress = {
            let tx = tx.clone();
            ProgressSink::new(
                move |total, current| {
                    let _ = tx.send(TaskEvent::Progress { total, current });
                },
                Arc::clone(&cancelled),
            )
        };

        // Hold the lock until the entry is inserted so a fast task cannot
        // deregister itself first.
        let mut running = lock(&self.running);

        let join = tokio::spawn({
            let registry = Arc::clone(&self.running);
            let cancelled = Arc::clone(&cancelled);
            let tx = tx.clone();
            async move {
                let _ = tx.send(TaskEvent::Started);
                let result = task.run(progress).await;

                let owned = lock(&registry).remove(&id).is_some();
                if !owned || cancelled.load(Ordering::SeqCst) {
                    return;
                }
                let event = match result {
                    Ok(output) => TaskEvent::Succeeded(output),
                    Err(TaskError::Cancelled) => TaskEvent::Cancelled,
                    Err(error) => TaskEvent::Failed(error),
                };
                let _ = tx.send(event);
            }
        });

        running.insert(
            id,
            RunningTask {
                tag: tag.clone(),
                abort: join.abort_handle(),
                cancelled: Arc::clone(&cancelled),
                notify_cancelled: Box::new(move || {
                    let _ = tx.send(TaskEvent::Cancelled);
                }),
            },
        );
        drop(running);

        debug!(task = %id, tag = ?tag, "task submitted");
        TaskHandle {
            id,
            tag,
            events: rx,
            cancelled,
        }
    }

    /// Cancel one task. Returns `false` if it already finished.
    pub fn cancel(&self, id: TaskId) -> bool {
        let entry = lock(&self.running).remove(&id);
        match entry {
            Some(task) => {
                task.cancel();
                debug!(task = %id, "task cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every running task carrying `tag`. Returns how many were hit.
    pub fn cancel_by_tag(&self, tag: &str) -> usize {
        let matched: Vec<RunningTask> = {
            let mut running = lock(&self.running);
            let ids: Vec<TaskId> = running
                .iter()
                .filter(|(_, task)| task.tag.as_deref() == Some(tag))
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| running.remove(id)).collect()
        };

        let count = matched.len();
        for task in matched {
            task.cancel();
        }
        if count > 0 {
            debug!(tag, count, "tasks cancelled by tag");
        }
        count
    }

    /// Cancel everything.
    pub fn cancel_all(&self) -> usize {
        let all: Vec<RunningTask> = lock(&self.running).drain().map(|(_, task)| task).collect();
        let count = all.len();
        for task in all {
            task.cancel();
        }
        count
    }

    pub fn running_count(&self) -> usize {
        lock(&self.running).len()
    }
}

impl fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskManager")
            .field("running", &self.running_count())
            .finish()
    }
}

/// Receiving end of a submitted task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    id: TaskId,
    tag: Option<String>,
    events: mpsc::UnboundedReceiver<TaskEvent<T>>,
    cancelled: Arc<AtomicBool>,
}

impl<T> TaskHandle<T> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// True once the task was cancelled; results must not be applied then.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Next lifecycle event, `None` after the terminal one.
    pub async fn next_event(&mut self) -> Option<TaskEvent<T>> {
        self.events.recv().await
    }

    /// Skip intermediate events and return the outcome.
    pub async fn wait(mut self) -> Result<T, TaskError> {
        while let Some(event) = self.next_event().await {
            match event {
                TaskEvent::Succeeded(output) => return Ok(output),
                TaskEvent::Failed(error) => return Err(error),
                TaskEvent::Cancelled => return Err(TaskError::Cancelled),
                TaskEvent::Started | TaskEvent::Progress { .. } => {}
            }
        }
        Err(TaskError::Cancelled)
    }
}
