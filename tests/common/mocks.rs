//! Mock configurations for integration tests.
//!
//! Re-exports the doubles from `skeleton::adapters::mock` and adds builders
//! for the HTTP setups the tests share.

pub use skeleton::adapters::mock::{
    ControllerCall, HostCall, MemoryPageSource, MockHttpClient, MockResponse, RecordingController,
    RecordingHost, ScriptedTask, StaticRegistry, StaticScreen,
};
pub use skeleton::traits::{Headers, HttpClient, HttpError, Response};

use bytes::Bytes;

/// Builder for a [`MockHttpClient`].
pub struct MockHttpConfig {
    client: MockHttpClient,
}

impl MockHttpConfig {
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// Answer `url` with `json` and `status`.
    pub fn with_json_response(self, url: &str, status: u16, json: &str) -> Self {
        self.client.set_response(
            url,
            MockResponse::Success(Response::new(status, Bytes::from(json.to_string()))),
        );
        self
    }

    /// Fail requests to `url` with a connection error.
    #[allow(dead_code)]
    pub fn with_connection_error(self, url: &str, message: &str) -> Self {
        self.client.set_response(
            url,
            MockResponse::Error(HttpError::ConnectionFailed(message.to_string())),
        );
        self
    }

    /// Serve `url` as `chunks` chunks of `chunk_size` bytes.
    #[allow(dead_code)]
    pub fn with_download(self, url: &str, chunks: usize, chunk_size: usize) -> Self {
        self.client.set_response(
            url,
            MockResponse::Stream(vec![Bytes::from(vec![0xAB; chunk_size]); chunks]),
        );
        self
    }

    pub fn build(self) -> MockHttpClient {
        self.client
    }
}

impl Default for MockHttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_http_config() {
        let client = MockHttpConfig::new()
            .with_json_response("https://api.test/items", 200, "[]")
            .build();

        let response = client
            .get("https://api.test/items", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(client.get_requests().len(), 1);
    }
}
