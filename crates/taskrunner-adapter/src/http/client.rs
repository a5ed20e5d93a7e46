/*
[INPUT]:  HTTP configuration (base URL, timeouts)
[OUTPUT]: Configured reqwest client ready for task service calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
[UPDATE]: Endpoint segments are appended to the base path instead of replacing it
*/

use crate::http::error::{extract_error_message, Result, TaskRunnerError};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default location of the task service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            // Runs are synchronous on the server side and may take minutes
            timeout: Duration::from_secs(180),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the remote task service
#[derive(Debug, Clone)]
pub struct TaskRunnerClient {
    http_client: Client,
    base_url: Url,
}

impl TaskRunnerClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(TaskRunnerError::Config(format!(
                "base url must be an http(s) url: {}",
                config.base_url
            )));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL by appending path segments to the base path
    pub(crate) fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TaskRunnerError::Config("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build request builder for an endpoint below the base path
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint_url(segments)?;
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(builder).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(TaskRunnerError::from)
    }

    /// Send a request whose success body carries nothing of interest
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "sending task service request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::debug!(
            %method,
            %url,
            status = status.as_u16(),
            ?message,
            "task service returned error"
        );
        Err(TaskRunnerError::api_error(status, message))
    }
}
