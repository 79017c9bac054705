//! Asynchronous tasks and their executor.
//!
//! A [`Task`] is one unit of background work (usually an HTTP request). The
//! [`TaskManager`] spawns it on tokio and hands back a [`TaskHandle`] that
//! yields a single ordered stream of [`TaskEvent`]s. Tasks carry an optional
//! tag; screens use their name as the tag so everything they started can be
//! cancelled when they leave the stack.

pub mod api;
pub mod manager;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

pub use api::{ApiTask, ClientInfo};
pub use manager::{TaskHandle, TaskId, TaskManager};

/// One unit of background work.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Tag used for bulk cancellation.
    fn tag(&self) -> Option<String> {
        None
    }

    /// Run to completion, reporting progress through `progress`.
    async fn run(&self, progress: ProgressSink) -> Result<Self::Output, TaskError>;
}

/// Lifecycle event of a submitted task.
///
/// `Started` comes first; exactly one of `Succeeded`, `Failed` or
/// `Cancelled` comes last.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent<T> {
    Started,
    Progress { total: u64, current: u64 },
    Succeeded(T),
    Failed(TaskError),
    Cancelled,
}

impl<T> TaskEvent<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskEvent::Succeeded(_) | TaskEvent::Failed(_) | TaskEvent::Cancelled
        )
    }
}

/// Progress reporter handed to [`Task::run`].
#[derive(Clone)]
pub struct ProgressSink {
    report: Arc<dyn Fn(u64, u64) + Send + Sync>,
    cancelled: Arc<AtomicBool>,
}

impl ProgressSink {
    pub fn new(report: impl Fn(u64, u64) + Send + Sync + 'static, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            report: Arc::new(report),
            cancelled,
        }
    }

    /// A sink that drops every report; for running tasks outside a manager.
    pub fn noop() -> Self {
        Self::new(|_, _| {}, Arc::new(AtomicBool::new(false)))
    }

    pub fn report(&self, total: u64, current: u64) {
        if !self.is_cancelled() {
            (self.report)(total, current);
        }
    }

    /// Long-running tasks should poll this between steps.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressSink")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
