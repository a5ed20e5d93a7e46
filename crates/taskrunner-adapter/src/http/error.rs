/*
[INPUT]:  Error sources (HTTP transport, API responses, serialization, URL building)
[OUTPUT]: Structured error types carrying the server-supplied message when present
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the task runner adapter
#[derive(Error, Debug)]
pub enum TaskRunnerError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success response
    #[error("API error (status {status}): {}", .message.as_deref().unwrap_or("<no message>"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Request rejected locally, nothing was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TaskRunnerError {
    /// Message supplied by the server in the error body, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TaskRunnerError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            TaskRunnerError::Api { status, .. } => Some(*status),
            TaskRunnerError::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Create an API error from status code and an optional body message
    pub fn api_error(status: StatusCode, message: Option<String>) -> Self {
        TaskRunnerError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Result type alias for task runner operations
pub type Result<T> = std::result::Result<T, TaskRunnerError>;

/// Pull a human readable message out of an error response body.
///
/// Accepts `{"message": ".."}` / `{"error": ".."}` objects, a bare JSON
/// string, or plain text. Blank bodies yield `None`.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(|value| value.as_str()))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string),
        Ok(serde_json::Value::String(text)) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        _ => Some(trimmed.to_string()),
    }
}
