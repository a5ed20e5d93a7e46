/*
[INPUT]:  Scripted failures, gates and seed tasks from unit tests
[OUTPUT]: In-memory TaskApi double with call counters
[POS]:    Test infrastructure - shared by console unit tests
[UPDATE]: When TaskApi gains operations
*/

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use taskrunner_adapter::{CreateTaskRequest, Result, Task, TaskApi, TaskExecution, TaskRunnerError};
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FakeOp {
    List,
    Search,
    Upsert,
    Delete,
    Execute,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub list: usize,
    pub search: usize,
    pub upsert: usize,
    pub delete: usize,
    pub execute: usize,
}

/// Blocks the next call of one operation until released
#[derive(Debug, Clone, Default)]
pub(crate) struct Gate {
    entered: Arc<Notify>,
    released: Arc<Notify>,
}

impl Gate {
    pub async fn wait_until_held(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.released.notified().await;
    }
}

#[derive(Debug, Default)]
struct FakeState {
    tasks: Vec<Task>,
    calls: CallCounts,
    failures: HashMap<FakeOp, Option<String>>,
    gates: HashMap<FakeOp, Gate>,
    execution_output: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeTaskApi {
    state: Mutex<FakeState>,
}

impl FakeTaskApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::new();
        api.lock().tasks = tasks;
        api
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn stored_tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// Next call of `op` fails with an API error carrying `message`
    pub fn fail_next(&self, op: FakeOp, message: Option<&str>) {
        self.lock().failures.insert(op, message.map(str::to_string));
    }

    pub fn hold(&self, op: FakeOp) -> Gate {
        let gate = Gate::default();
        self.lock().gates.insert(op, gate.clone());
        gate
    }

    pub fn set_execution_output(&self, output: &str) {
        self.lock().execution_output = Some(output.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, wait at a gate if one is set, then apply scripted failure
    async fn enter(&self, op: FakeOp) -> Result<()> {
        let gate = {
            let mut state = self.lock();
            match op {
                FakeOp::List => state.calls.list += 1,
                FakeOp::Search => state.calls.search += 1,
                FakeOp::Upsert => state.calls.upsert += 1,
                FakeOp::Delete => state.calls.delete += 1,
                FakeOp::Execute => state.calls.execute += 1,
            }
            state.gates.remove(&op)
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }

        match self.lock().failures.remove(&op) {
            Some(message) => Err(TaskRunnerError::Api {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }
}

fn not_found() -> TaskRunnerError {
    TaskRunnerError::Api {
        status: 404,
        message: Some("Task not found".to_string()),
    }
}

#[async_trait]
impl TaskApi for FakeTaskApi {
    async fn list(&self, id: Option<&str>) -> Result<Vec<Task>> {
        self.enter(FakeOp::List).await?;
        let state = self.lock();
        match id {
            None => Ok(state.tasks.clone()),
            Some(id) => state
                .tasks
                .iter()
                .find(|task| task.id == id)
                .cloned()
                .map(|task| vec![task])
                .ok_or_else(not_found),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<Task>> {
        if query.trim().is_empty() {
            return Err(TaskRunnerError::InvalidRequest("blank query".to_string()));
        }
        self.enter(FakeOp::Search).await?;
        let needle = query.to_lowercase();
        Ok(self
            .lock()
            .tasks
            .iter()
            .filter(|task| task.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn upsert(&self, request: &CreateTaskRequest) -> Result<Task> {
        self.enter(FakeOp::Upsert).await?;
        let mut state = self.lock();
        if let Some(existing) = state.tasks.iter_mut().find(|task| task.id == request.id) {
            existing.name = request.name.clone();
            existing.owner = request.owner.clone();
            existing.command = request.command.clone();
            return Ok(existing.clone());
        }
        let task = Task {
            id: request.id.clone(),
            name: request.name.clone(),
            owner: request.owner.clone(),
            command: request.command.clone(),
            task_executions: Vec::new(),
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.enter(FakeOp::Delete).await?;
        let mut state = self.lock();
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            return Err(TaskRunnerError::Api {
                status: 404,
                message: Some("Not found".to_string()),
            });
        }
        Ok(())
    }

    async fn execute(&self, id: &str) -> Result<TaskExecution> {
        self.enter(FakeOp::Execute).await?;
        let mut state = self.lock();
        let output = state
            .execution_output
            .clone()
            .unwrap_or_else(|| "Hello World\n".to_string());
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(not_found)?;
        let run = task.task_executions.len() as i64;
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default()
            + Duration::minutes(run);
        let execution = TaskExecution {
            start_time: start,
            end_time: start + Duration::milliseconds(1500),
            output,
        };
        task.task_executions.push(execution.clone());
        Ok(execution)
    }
}

/// Task with `runs` successful executions, one minute apart
pub(crate) fn task(id: &str, name: &str, runs: usize) -> Task {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
    Task {
        id: id.to_string(),
        name: name.to_string(),
        owner: "ops".to_string(),
        command: format!("echo {name}"),
        task_executions: (0..runs)
            .map(|run| {
                let start = base + Duration::minutes(run as i64);
                TaskExecution {
                    start_time: start,
                    end_time: start + Duration::milliseconds(250),
                    output: format!("run {run}\n"),
                }
            })
            .collect(),
    }
}
