//! Data source backed by an HTTP endpoint and a local cache.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TaskError;
use crate::pagination::source::{DataSource, PageRequest};
use crate::pagination::state::LoadAction;
use crate::task::{ApiTask, ClientInfo};
use crate::traits::{HttpClient, LocalCache};

type Converter<T> = Arc<dyn Fn(&Value) -> Result<Vec<T>, TaskError> + Send + Sync>;

/// Converter that deserializes the array found at a JSON pointer.
///
/// An empty pointer means the whole body is the array.
pub fn json_list<T: DeserializeOwned>(
    pointer: &str,
) -> impl Fn(&Value) -> Result<Vec<T>, TaskError> + Send + Sync + 'static {
    let pointer = pointer.to_string();
    move |body: &Value| -> Result<Vec<T>, TaskError> {
        let list = body
            .pointer(&pointer)
            .ok_or_else(|| TaskError::InvalidResponse(format!("missing list at '{}'", pointer)))?;
        Ok(serde_json::from_value(list.clone())?)
    }
}

/// Sends `offset`/`limit` with the list arguments and writes every server
/// page to the cache: a refresh replaces it, a fetch-more appends.
pub struct HttpPageSource<T, C> {
    client: Arc<dyn HttpClient>,
    url: String,
    cache: C,
    convert: Converter<T>,
    client_info: ClientInfo,
    total_pointer: Option<String>,
    _item: PhantomData<fn() -> T>,
}

impl<T, C> HttpPageSource<T, C>
where
    T: Clone + Send + Sync + 'static,
    C: LocalCache<T> + 'static,
{
    pub fn new(
        client: Arc<dyn HttpClient>,
        url: impl Into<String>,
        cache: C,
        convert: impl Fn(&Value) -> Result<Vec<T>, TaskError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            cache,
            convert: Arc::new(convert),
            client_info: ClientInfo::default(),
            total_pointer: None,
            _item: PhantomData,
        }
    }

    pub fn with_client_info(mut self, info: ClientInfo) -> Self {
        self.client_info = info;
        self
    }

    /// JSON pointer of the total row count in the response body.
    pub fn with_total_at(mut self, pointer: impl Into<String>) -> Self {
        self.total_pointer = Some(pointer.into());
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<T, C> DataSource for HttpPageSource<T, C>
where
    T: Clone + Send + Sync + 'static,
    C: LocalCache<T> + 'static,
{
    type Item = T;
    type Task = ApiTask;

    fn fetch_local(&self, offset: usize, limit: usize) -> Result<Vec<T>, TaskError> {
        self.cache.fetch_page(offset, limit)
    }

    fn create_task(&self, request: &PageRequest) -> ApiTask {
        let mut task = ApiTask::new(Arc::clone(&self.client), self.url.clone())
            .with_client_info(&self.client_info)
            .with_arguments(&request.arguments);
        task.add_argument("offset", request.offset as u64);
        task.add_argument("limit", request.limit as u64);
        match &request.tag {
            Some(tag) => task.with_tag(tag.clone()),
            None => task,
        }
    }

    fn convert(&self, output: &Value) -> Result<Vec<T>, TaskError> {
        (self.convert)(output)
    }

    fn store(&self, action: LoadAction, items: &[T]) -> Result<(), TaskError> {
        match action {
            LoadAction::Refresh => self.cache.replace_all(items),
            LoadAction::FetchMore => self.cache.append(items),
        }
    }

    fn total(&self, output: &Value) -> Option<u64> {
        let pointer = self.total_pointer.as_deref()?;
        output.pointer(pointer).and_then(Value::as_u64)
    }
}
