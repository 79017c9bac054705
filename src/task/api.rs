//! HTTP GET task with a typed argument map and default client headers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::arguments::Arguments;
use crate::error::TaskError;
use crate::task::{ProgressSink, Task};
use crate::traits::{Headers, HttpClient};

/// Identification sent with every API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub platform: String,
    pub app_version: String,
    pub os: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            platform: "rust".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
        }
    }
}

impl ClientInfo {
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("platform".to_string(), self.platform.clone());
        headers.insert("appVersion".to_string(), self.app_version.clone());
        headers.insert("os".to_string(), self.os.clone());
        headers
    }
}

/// GET `url?arguments` and parse the body as JSON.
#[derive(Clone)]
pub struct ApiTask {
    client: Arc<dyn HttpClient>,
    url: String,
    arguments: Arguments,
    headers: Headers,
    tag: Option<String>,
}

impl ApiTask {
    pub fn new(client: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            arguments: Arguments::new(),
            headers: ClientInfo::default().headers(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_client_info(mut self, info: &ClientInfo) -> Self {
        self.headers.extend(info.headers());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: &Arguments) -> Self {
        self.arguments.merge(arguments);
        self
    }

    pub fn add_argument(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.arguments.insert(key, value);
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Full request URL with the encoded query string.
    pub fn request_url(&self) -> String {
        if self.arguments.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, self.arguments.to_query_string())
    }
}

#[async_trait]
impl Task for ApiTask {
    type Output = Value;

    fn tag(&self) -> Option<String> {
        self.tag.clone()
    }

    async fn run(&self, _progress: ProgressSink) -> Result<Value, TaskError> {
        let url = self.request_url();
        debug!(%url, "api request");

        let response = self.client.get(&url, &self.headers).await?;
        if !response.is_success() {
            let message = response.text().unwrap_or_default();
            warn!(%url, status = response.status, "api request failed");
            return Err(TaskError::Server {
                status: response.status,
                message,
            });
        }

        Ok(response.json::<Value>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::{HttpError, Response};
    use bytes::Bytes;

    #[test]
    fn test_request_url_appends_query() {
        let client = Arc::new(MockHttpClient::new());
        let mut task = ApiTask::new(client.clone(), "https://api.test/items");
        assert_eq!(task.request_url(), "https://api.test/items");

        task.add_argument("offset", 0);
        task.add_argument("limit", 30);
        assert_eq!(
            task.request_url(),
            "https://api.test/items?limit=30&offset=0"
        );

        let task = ApiTask::new(client, "https://api.test/items?sort=asc")
            .with_arguments(&Arguments::new().with("q", "a b"));
        assert_eq!(task.request_url(), "https://api.test/items?sort=asc&q=a%20b");
    }

    #[test]
    fn test_default_headers() {
        let task = ApiTask::new(Arc::new(MockHttpClient::new()), "https://api.test");
        let headers = task.headers();
        assert_eq!(headers.get("platform").map(String::as_str), Some("rust"));
        assert_eq!(
            headers.get("appVersion").map(String::as_str),
            Some(env!("CARGO_PKG_VERSION"))
        );
        assert!(headers.contains_key("os"));
    }

    #[tokio::test]
    async fn test_run_parses_json() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            "https://api.test/items?limit=2",
            MockResponse::Success(Response::new(200, Bytes::from(r#"[{"id":1},{"id":2}]"#))),
        );
        let mut task = ApiTask::new(client.clone(), "https://api.test/items");
        task.add_argument("limit", 2);

        let value = task.run(ProgressSink::noop()).await.unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].headers.get("platform").map(String::as_str), Some("rust"));
    }

    #[tokio::test]
    async fn test_non_success_is_server_error() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            "https://api.test/items",
            MockResponse::Success(Response::new(503, Bytes::from("maintenance"))),
        );
        let task = ApiTask::new(client, "https://api.test/items");

        let err = task.run(ProgressSink::noop()).await.unwrap_err();
        assert_eq!(
            err,
            TaskError::Server {
                status: 503,
                message: "maintenance".into()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_response() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            "https://api.test/x",
            MockResponse::Success(Response::new(200, Bytes::from("{oops"))),
        );
        let task = ApiTask::new(client, "https://api.test/x");

        let err = task.run(ProgressSink::noop()).await.unwrap_err();
        assert!(matches!(err, TaskError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let client = Arc::new(MockHttpClient::new());
        client.set_response(
            "https://api.test/x",
            MockResponse::Error(HttpError::ConnectionFailed("refused".into())),
        );
        let task = ApiTask::new(client, "https://api.test/x");

        let err = task.run(ProgressSink::noop()).await.unwrap_err();
        assert_eq!(err, TaskError::Network("refused".into()));
    }
}
