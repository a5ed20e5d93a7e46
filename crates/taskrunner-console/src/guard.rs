/*
[INPUT]:  Task ids about to be executed
[OUTPUT]: Per-task busy permits released on drop
[POS]:    Execution guard - advisory single-flight tracking for task runs
[UPDATE]: When changing how in-flight executions are tracked
*/

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Tracks which tasks currently have an execution in flight.
///
/// Advisory only: it gates UI affordances, the server does not know about it.
/// Each task id is tracked independently, so a run of one task never changes
/// the busy state of another.
#[derive(Debug, Clone, Default)]
pub struct ExecutionGuard {
    in_flight: Arc<Mutex<BTreeSet<String>>>,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `task_id` busy. `None` when that task is already running.
    pub fn try_acquire(&self, task_id: &str) -> Option<ExecutionPermit> {
        let mut in_flight = self.lock();
        if !in_flight.insert(task_id.to_string()) {
            return None;
        }
        tracing::debug!(task_id, "execution guard acquired");
        Some(ExecutionPermit {
            in_flight: Arc::clone(&self.in_flight),
            task_id: task_id.to_string(),
        })
    }

    pub fn is_busy(&self, task_id: &str) -> bool {
        self.lock().contains(task_id)
    }

    /// Busy task ids in sorted order
    pub fn busy_ids(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn any_busy(&self) -> bool {
        !self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Busy marker for one task; clears itself when dropped
#[derive(Debug)]
pub struct ExecutionPermit {
    in_flight: Arc<Mutex<BTreeSet<String>>>,
    task_id: String,
}

impl ExecutionPermit {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}

impl Drop for ExecutionPermit {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.task_id);
        tracing::debug!(task_id = %self.task_id, "execution guard released");
    }
}
