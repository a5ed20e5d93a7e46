/*
[INPUT]:  Task service JSON schema and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::Task;

/// Body of `PUT /tasks`; executions are server-managed and never sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub command: String,
}

impl From<&Task> for CreateTaskRequest {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            owner: task.owner.clone(),
            command: task.command.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_executions() {
        let request = CreateTaskRequest {
            id: "t1".to_string(),
            name: "Hello".to_string(),
            owner: "ops".to_string(),
            command: "echo hi".to_string(),
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"id": "t1", "name": "Hello", "owner": "ops", "command": "echo hi"})
        );
    }
}
