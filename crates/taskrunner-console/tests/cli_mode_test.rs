use std::process::{Command, Output};

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn console_command(args: &[&str]) -> Command {
    // Get the path to the binary from Cargo
    let binary_path = env!("CARGO_BIN_EXE_taskrunner-console");
    // Keep a developer's own config file out of the picture
    let config_home = std::env::temp_dir().join("taskrunner-console-cli-test");

    let mut command = Command::new(binary_path);
    command
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("TASKRUNNER__LOGGING__LEVEL", "error");
    command
}

async fn run(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        console_command(&args)
            .output()
            .expect("Failed to start taskrunner-console binary")
    })
    .await
    .expect("join")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn config_subcommand_prints_effective_config() {
    let output = console_command(&[
        "--base-url",
        "http://tasks.example:9000/api",
        "--log-level",
        "warn",
        "config",
    ])
    .output()
    .expect("Failed to start taskrunner-console binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStderr: {}",
        output.status,
        stderr(&output)
    );
    let yaml = stdout(&output);
    assert!(yaml.contains("base_url: http://tasks.example:9000/api"), "{yaml}");
    assert!(yaml.contains("level: warn"), "{yaml}");
}

#[test]
fn non_http_base_url_is_rejected() {
    let output = console_command(&["--base-url", "ftp://tasks.example/api", "list"])
        .output()
        .expect("Failed to start taskrunner-console binary");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("http or https"), "{}", stderr(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_prints_task_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "hello-1",
            "name": "Hello",
            "owner": "ops",
            "command": "echo hello",
            "taskExecutions": [],
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(vec![
        "--base-url".to_string(),
        format!("{}/api", server.uri()),
        "list".to_string(),
    ])
    .await;

    assert!(output.status.success(), "Stderr: {}", stderr(&output));
    let table = stdout(&output);
    assert!(table.contains("hello-1"), "{table}");
    assert!(table.contains("0 runs"), "{table}");
}

#[tokio::test(flavor = "multi_thread")]
async fn save_with_invalid_id_fails_without_upsert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(vec![
        "--base-url".to_string(),
        format!("{}/api", server.uri()),
        "save".to_string(),
        "--id".to_string(),
        "bad id".to_string(),
        "--name".to_string(),
        "Hello".to_string(),
        "--owner".to_string(),
        "ops".to_string(),
        "--command".to_string(),
        "echo hello".to_string(),
    ])
    .await;

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("ID can only contain letters, numbers, hyphens, and underscores"),
        "{}",
        stderr(&output)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn run_failure_prints_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/hello-1/run"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Execution failed: boom"))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(vec![
        "--base-url".to_string(),
        format!("{}/api", server.uri()),
        "run".to_string(),
        "hello-1".to_string(),
    ])
    .await;

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("Execution failed: boom"),
        "{}",
        stderr(&output)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn list_by_missing_id_prints_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(query_param("id", "ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Task not found"))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(vec![
        "--base-url".to_string(),
        format!("{}/api", server.uri()),
        "list".to_string(),
        "--id".to_string(),
        "ghost".to_string(),
    ])
    .await;

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty(), "{}", stdout(&output));
    let stderr = stderr(&output);
    assert_eq!(stderr.matches("Task not found").count(), 1, "{stderr}");
}
