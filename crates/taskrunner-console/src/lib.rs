/*
[INPUT]:  Public API exports for taskrunner-console crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod coordinator;
pub mod error;
pub mod form;
pub mod guard;
pub mod history;
pub mod logging;
pub mod notice;
pub mod store;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use config::{ConfigOverrides, ConsoleConfig};
pub use coordinator::{ConsoleCoordinator, ConsoleView};
pub use error::{ConsoleError, RemoteOperation, Result};
pub use form::{FormField, FormMode, SubmitRejection, TaskForm, TaskFormController};
pub use guard::{ExecutionGuard, ExecutionPermit};
pub use history::{
    ExecutionStatus, HistoryEntry, HistoryProjector, HistoryView, MarkerClassifier,
    StatusClassifier,
};
pub use notice::{Notice, NoticeKind, Notifier};
pub use store::{FetchOutcome, StoreSnapshot, TaskStore};
