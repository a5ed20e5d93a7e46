/*
[INPUT]:  Validation failures, adapter errors, coordinator rule violations
[OUTPUT]: ConsoleError with a display message fit for a user notice
[POS]:    Error handling layer - console core error taxonomy
[UPDATE]: When adding operations or new failure kinds
*/

use std::fmt;

use taskrunner_adapter::TaskRunnerError;
use thiserror::Error;

use crate::form::ValidationErrors;

/// Remote operations issued by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    List,
    Search,
    Upsert,
    Delete,
    Execute,
}

impl RemoteOperation {
    /// Message shown when the server supplies none
    pub fn fallback_message(self) -> &'static str {
        match self {
            RemoteOperation::List => "Failed to load tasks",
            RemoteOperation::Search => "Search failed",
            RemoteOperation::Upsert => "Failed to save task",
            RemoteOperation::Delete => "Failed to delete task",
            RemoteOperation::Execute => "Failed to execute task",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteOperation::List => "list",
            RemoteOperation::Search => "search",
            RemoteOperation::Upsert => "upsert",
            RemoteOperation::Delete => "delete",
            RemoteOperation::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// Console actions that may be refused by the current view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    Create,
    Edit,
    ShowHistory,
    RequestDelete,
    ConfirmDelete,
    Submit,
}

/// Main error type for the console core
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Client-side form validation; never reaches the network
    #[error("{0}")]
    Validation(ValidationErrors),

    /// A remote call failed; `message` is what the user sees
    #[error("{message}")]
    Remote {
        operation: RemoteOperation,
        message: String,
        #[source]
        source: TaskRunnerError,
    },

    /// The same operation is already outstanding
    #[error("{0} already in progress")]
    Busy(String),

    /// Action not allowed from the current view
    #[error("cannot {action:?} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: ConsoleAction,
    },

    /// History requested for a task that never ran
    #[error("No execution history available for task {task_id}")]
    NoHistory { task_id: String },

    #[error("Task {0} is not in the current list")]
    UnknownTask(String),
}

impl ConsoleError {
    /// Wrap an adapter error, preferring the server's own message
    pub fn remote(operation: RemoteOperation, source: TaskRunnerError) -> Self {
        let message = source
            .server_message()
            .unwrap_or(operation.fallback_message())
            .to_string();
        ConsoleError::Remote {
            operation,
            message,
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ConsoleError::Validation(_))
    }

    /// Remote failures are the ones surfaced as notices
    pub fn is_remote(&self) -> bool {
        matches!(self, ConsoleError::Remote { .. })
    }
}

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_prefers_server_message() {
        let source = TaskRunnerError::Api {
            status: 400,
            message: Some("Unsafe command".into()),
        };
        let err = ConsoleError::remote(RemoteOperation::Upsert, source);
        assert_eq!(err.to_string(), "Unsafe command");
    }

    #[test]
    fn test_remote_falls_back_per_operation() {
        let cases = [
            (RemoteOperation::List, "Failed to load tasks"),
            (RemoteOperation::Search, "Search failed"),
            (RemoteOperation::Upsert, "Failed to save task"),
            (RemoteOperation::Delete, "Failed to delete task"),
            (RemoteOperation::Execute, "Failed to execute task"),
        ];

        for (operation, expected) in cases {
            let source = TaskRunnerError::Api {
                status: 500,
                message: None,
            };
            let err = ConsoleError::remote(operation, source);
            assert_eq!(err.to_string(), expected);
        }
    }
}
