/*
[INPUT]:  Task service JSON schema (camelCase) and serde requirements
[OUTPUT]: Typed Task / TaskExecution structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
[UPDATE]: Accept epoch-millisecond instants alongside RFC 3339 strings
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, owned, remotely executable command definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub command: String,
    /// Server-owned run records in chronological order
    #[serde(default, deserialize_with = "serde_helpers::deserialize_null_as_empty")]
    pub task_executions: Vec<TaskExecution>,
}

impl Task {
    pub fn execution_count(&self) -> usize {
        self.task_executions.len()
    }

    pub fn has_history(&self) -> bool {
        !self.task_executions.is_empty()
    }
}

/// One completed run of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecution {
    #[serde(deserialize_with = "serde_helpers::deserialize_instant")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "serde_helpers::deserialize_instant")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub output: String,
}

impl TaskExecution {
    /// Wall-clock duration of the run in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds()
    }
}

/// Body of `GET /tasks`, which answers with an array or a lone object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TaskListPayload {
    Many(Vec<Task>),
    One(Box<Task>),
}

impl From<TaskListPayload> for Vec<Task> {
    fn from(payload: TaskListPayload) -> Self {
        match payload {
            TaskListPayload::Many(tasks) => tasks,
            TaskListPayload::One(task) => vec![*task],
        }
    }
}

mod serde_helpers {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize_instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(raw) => DateTime::parse_from_rfc3339(raw.trim())
                .map(|value| value.with_timezone(&Utc))
                .map_err(serde::de::Error::custom),
            Value::Number(number) => {
                let millis = number
                    .as_i64()
                    .ok_or_else(|| serde::de::Error::custom("instant out of range"))?;
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .ok_or_else(|| serde::de::Error::custom("instant out of range"))
            }
            other => Err(serde::de::Error::custom(format!(
                "expected RFC 3339 string or epoch millis, got {other}"
            ))),
        }
    }

    pub fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserializes_camel_case() {
        let raw = r#"{
            "id": "t1",
            "name": "Hello",
            "owner": "ops",
            "command": "echo hello",
            "taskExecutions": [
                {
                    "startTime": "2024-01-01T00:00:00.000Z",
                    "endTime": "2024-01-01T00:00:01.500Z",
                    "output": "Hello World\n"
                }
            ]
        }"#;

        let task: Task = serde_json::from_str(raw).expect("task");
        assert_eq!(task.id, "t1");
        assert_eq!(task.execution_count(), 1);
        assert_eq!(task.task_executions[0].duration_ms(), 1500);
        assert_eq!(task.task_executions[0].output, "Hello World\n");
    }

    #[test]
    fn test_missing_or_null_executions_default_to_empty() {
        let missing: Task =
            serde_json::from_str(r#"{"id":"a","name":"n","owner":"o","command":"ls"}"#)
                .expect("missing");
        let null: Task = serde_json::from_str(
            r#"{"id":"a","name":"n","owner":"o","command":"ls","taskExecutions":null}"#,
        )
        .expect("null");

        assert!(!missing.has_history());
        assert!(!null.has_history());
    }

    #[test]
    fn test_instant_accepts_offsets_and_epoch_millis() {
        let raw = r#"{
            "startTime": "2024-01-01T02:00:00.000+02:00",
            "endTime": 1704067200250,
            "output": ""
        }"#;

        let execution: TaskExecution = serde_json::from_str(raw).expect("execution");
        assert_eq!(execution.start_time.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(execution.duration_ms(), 250);
    }

    #[test]
    fn test_instant_rejects_garbage() {
        let raw = r#"{"startTime": true, "endTime": 0, "output": ""}"#;
        assert!(serde_json::from_str::<TaskExecution>(raw).is_err());
    }

    #[test]
    fn test_list_payload_normalizes_single_object() {
        let one: TaskListPayload =
            serde_json::from_str(r#"{"id":"a","name":"n","owner":"o","command":"ls"}"#)
                .expect("one");
        let many: TaskListPayload = serde_json::from_str(
            r#"[{"id":"a","name":"n","owner":"o","command":"ls"},{"id":"b","name":"m","owner":"o","command":"pwd"}]"#,
        )
        .expect("many");

        let one: Vec<Task> = one.into();
        let many: Vec<Task> = many.into();
        assert_eq!(one.len(), 1);
        assert_eq!(many.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
    }
}
