/*
[INPUT]:  Task ids, search queries and CreateTaskRequest bodies
[OUTPUT]: Task lists, saved tasks and execution records
[POS]:    HTTP layer - task endpoints (list/search/upsert/delete/run)
[UPDATE]: When adding new task endpoints or changing response format
[UPDATE]: Map zero-match search (404) to an empty result
*/

use async_trait::async_trait;
use reqwest::Method;

use crate::api::TaskApi;
use crate::http::{Result, TaskRunnerClient, TaskRunnerError};
use crate::types::{CreateTaskRequest, Task, TaskExecution, TaskListPayload};

const TASKS: &str = "tasks";

#[async_trait]
impl TaskApi for TaskRunnerClient {
    /// GET /tasks or GET /tasks?id={id}
    async fn list(&self, id: Option<&str>) -> Result<Vec<Task>> {
        let mut builder = self.request(Method::GET, &[TASKS])?;
        if let Some(id) = id {
            builder = builder.query(&[("id", id)]);
        }
        let payload: TaskListPayload = self.send_json(builder).await?;
        Ok(payload.into())
    }

    /// GET /tasks/search?q={query}
    async fn search(&self, query: &str) -> Result<Vec<Task>> {
        if query.trim().is_empty() {
            return Err(TaskRunnerError::InvalidRequest(
                "search query must not be blank".to_string(),
            ));
        }

        let builder = self
            .request(Method::GET, &[TASKS, "search"])?
            .query(&[("q", query)]);
        match self.send_json(builder).await {
            Ok(tasks) => Ok(tasks),
            // The service answers a search without matches with 404
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// PUT /tasks
    async fn upsert(&self, task: &CreateTaskRequest) -> Result<Task> {
        let builder = self.request(Method::PUT, &[TASKS])?.json(task);
        self.send_json(builder).await
    }

    /// DELETE /tasks/{id}
    async fn delete(&self, id: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, &[TASKS, id])?;
        self.send_empty(builder).await
    }

    /// PUT /tasks/{id}/run
    async fn execute(&self, id: &str) -> Result<TaskExecution> {
        let builder = self.request(Method::PUT, &[TASKS, id, "run"])?;
        self.send_json(builder).await
    }
}
