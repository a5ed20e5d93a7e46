/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for taskrunner-adapter tests

use taskrunner_adapter::{ClientConfig, TaskRunnerClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server, with the `/api` prefix the service uses
pub fn client_for(server: &MockServer) -> TaskRunnerClient {
    TaskRunnerClient::with_config(ClientConfig {
        base_url: format!("{}/api", server.uri()),
        ..ClientConfig::default()
    })
    .expect("client init")
}

/// Task JSON as the service renders it
pub fn task_json(id: &str, name: &str, executions: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "owner": "ops",
        "command": "echo hello",
        "taskExecutions": executions,
    })
}
