/*
[INPUT]:  Task identifiers, search terms and upsert bodies
[OUTPUT]: Typed task service results
[POS]:    Client seam - abstraction over the remote task service
[UPDATE]: When adding operations to the remote contract
*/

use async_trait::async_trait;

use crate::http::Result;
use crate::types::{CreateTaskRequest, Task, TaskExecution};

/// Remote task service operations
///
/// Each call is a single round trip with no retry. Implemented over HTTP by
/// [`crate::TaskRunnerClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// All tasks, or the single task matching `id` as a one-element list
    async fn list(&self, id: Option<&str>) -> Result<Vec<Task>>;

    /// Server-side name search. Blank queries are rejected without a call.
    async fn search(&self, query: &str) -> Result<Vec<Task>>;

    /// Create the task if its id is unknown, otherwise replace its mutable fields
    async fn upsert(&self, task: &CreateTaskRequest) -> Result<Task>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Run the task and wait for the finished execution record
    async fn execute(&self, id: &str) -> Result<TaskExecution>;
}
