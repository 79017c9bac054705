//! Scripted tasks and data sources for list tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::InMemoryCache;
use crate::error::TaskError;
use crate::pagination::{DataSource, LoadAction, PageRequest};
use crate::task::{ProgressSink, Task};
use crate::traits::LocalCache;

/// Task that sleeps, reports scripted progress and returns a preset result.
#[derive(Debug, Clone)]
pub struct ScriptedTask<T> {
    tag: Option<String>,
    result: Result<T, TaskError>,
    delay: Duration,
    progress: Vec<(u64, u64)>,
}

impl<T> ScriptedTask<T> {
    pub fn new(result: Result<T, TaskError>) -> Self {
        Self {
            tag: None,
            result,
            delay: Duration::ZERO,
            progress: Vec::new(),
        }
    }

    pub fn ok(output: T) -> Self {
        Self::new(Ok(output))
    }

    pub fn err(error: TaskError) -> Self {
        Self::new(Err(error))
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_progress(mut self, steps: Vec<(u64, u64)>) -> Self {
        self.progress = steps;
        self
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> Task for ScriptedTask<T> {
    type Output = T;

    fn tag(&self) -> Option<String> {
        self.tag.clone()
    }

    async fn run(&self, progress: ProgressSink) -> Result<T, TaskError> {
        for (total, current) in &self.progress {
            progress.report(*total, *current);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Data source over an [`InMemoryCache`] with a queue of scripted server pages.
///
/// Each server request pops the next scripted answer; an exhausted queue
/// answers with an empty page.
#[derive(Debug)]
pub struct MemoryPageSource<T> {
    cache: InMemoryCache<T>,
    server: Mutex<VecDeque<Result<Vec<T>, TaskError>>>,
    requests: Mutex<Vec<PageRequest>>,
    delay: Duration,
    total: Option<u64>,
}

impl<T: Clone + Send + Sync + 'static> MemoryPageSource<T> {
    pub fn new() -> Self {
        Self::with_cache(Vec::new())
    }

    pub fn with_cache(rows: Vec<T>) -> Self {
        Self {
            cache: InMemoryCache::with_rows(rows),
            server: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            total: None,
        }
    }

    /// Delay every server answer, so tests can race a second load or a cancel.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn push_page(&self, page: Vec<T>) {
        self.server.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self, error: TaskError) {
        self.server.lock().unwrap().push_back(Err(error));
    }

    /// Server requests made so far.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn cached(&self) -> Vec<T> {
        self.cache.fetch_page(0, usize::MAX).unwrap_or_default()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for MemoryPageSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> DataSource for MemoryPageSource<T> {
    type Item = T;
    type Task = ScriptedTask<Vec<T>>;

    fn fetch_local(&self, offset: usize, limit: usize) -> Result<Vec<T>, TaskError> {
        self.cache.fetch_page(offset, limit)
    }

    fn create_task(&self, request: &PageRequest) -> Self::Task {
        self.requests.lock().unwrap().push(request.clone());
        let answer = self
            .server
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        let task = ScriptedTask::new(answer).with_delay(self.delay);
        match &request.tag {
            Some(tag) => task.with_tag(tag.clone()),
            None => task,
        }
    }

    fn convert(&self, output: &Vec<T>) -> Result<Vec<T>, TaskError> {
        Ok(output.clone())
    }

    fn store(&self, action: LoadAction, items: &[T]) -> Result<(), TaskError> {
        match action {
            LoadAction::Refresh => self.cache.replace_all(items),
            LoadAction::FetchMore => self.cache.append(items),
        }
    }

    fn total(&self, _output: &Vec<T>) -> Option<u64> {
        self.total
    }
}
