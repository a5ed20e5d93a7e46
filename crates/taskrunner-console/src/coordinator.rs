/*
[INPUT]:  User intents from the rendering layer (search, create, edit, run, history, delete)
[OUTPUT]: View state transitions, notices, refreshed task list
[POS]:    Console coordinator - composes store, guard, form controller and projector
[UPDATE]: When adding user actions or overlay kinds
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taskrunner_adapter::{Task, TaskApi, TaskExecution};

use crate::error::{ConsoleAction, ConsoleError, RemoteOperation, Result};
use crate::form::{FormMode, SubmitRejection, TaskForm, TaskFormController};
use crate::guard::ExecutionGuard;
use crate::history::{HistoryProjector, HistoryView};
use crate::notice::Notifier;
use crate::store::{FetchOutcome, StoreSnapshot, TaskStore};

/// Which overlay is showing, as seen by the rendering layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleView {
    Idle,
    Creating,
    Editing { task: Task },
    ViewingHistory { task: Task, history: HistoryView },
    ConfirmingDelete { task_id: String },
}

impl ConsoleView {
    fn label(&self) -> &'static str {
        match self {
            ConsoleView::Idle => "idle",
            ConsoleView::Creating => "creating a task",
            ConsoleView::Editing { .. } => "editing a task",
            ConsoleView::ViewingHistory { .. } => "viewing history",
            ConsoleView::ConfirmingDelete { .. } => "confirming a delete",
        }
    }
}

enum Overlay<C: ?Sized> {
    Idle,
    Form(Arc<TaskFormController<C>>, Option<Task>),
    History(Task, HistoryView),
    ConfirmDelete(String),
}

impl<C: ?Sized> Overlay<C> {
    fn view(&self) -> ConsoleView {
        match self {
            Overlay::Idle => ConsoleView::Idle,
            Overlay::Form(_, None) => ConsoleView::Creating,
            Overlay::Form(_, Some(task)) => ConsoleView::Editing { task: task.clone() },
            Overlay::History(task, history) => ConsoleView::ViewingHistory {
                task: task.clone(),
                history: history.clone(),
            },
            Overlay::ConfirmDelete(task_id) => ConsoleView::ConfirmingDelete {
                task_id: task_id.clone(),
            },
        }
    }
}

/// Owns the console's overlays and routes every user action.
///
/// All methods take `&self`; state is kept in short lock sections that are
/// never held across a remote call, so independent actions may overlap.
pub struct ConsoleCoordinator<C: ?Sized> {
    client: Arc<C>,
    store: TaskStore<C>,
    guard: ExecutionGuard,
    projector: HistoryProjector,
    notifier: Notifier,
    overlay: Mutex<Overlay<C>>,
    deleting: AtomicBool,
}

impl<C: TaskApi + ?Sized> ConsoleCoordinator<C> {
    pub fn new(client: Arc<C>, projector: HistoryProjector, notifier: Notifier) -> Self {
        Self {
            store: TaskStore::new(Arc::clone(&client), notifier.clone()),
            client,
            guard: ExecutionGuard::new(),
            projector,
            notifier,
            overlay: Mutex::new(Overlay::Idle),
            deleting: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &TaskStore<C> {
        &self.store
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    pub fn view(&self) -> ConsoleView {
        self.lock().view()
    }

    /// Busy indicator for the run control of `task_id`
    pub fn is_executing(&self, task_id: &str) -> bool {
        self.guard.is_busy(task_id)
    }

    pub fn executing_ids(&self) -> Vec<String> {
        self.guard.busy_ids()
    }

    /// Full reload; failures become an error notice
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        self.store.refresh().await.inspect_err(|err| {
            self.notifier.error(err.to_string());
        })
    }

    /// Blank queries route to `refresh`
    pub async fn search(&self, query: &str) -> Result<FetchOutcome> {
        self.store.apply_search(query).await.inspect_err(|err| {
            self.notifier.error(err.to_string());
        })
    }

    /// Look up one task on the server without touching the list; remote
    /// failures become an error notice
    pub async fn fetch_task(&self, task_id: &str) -> Result<Task> {
        let tasks = self
            .client
            .list(Some(task_id))
            .await
            .map_err(|err| ConsoleError::remote(RemoteOperation::List, err))
            .inspect_err(|err| self.notifier.error(err.to_string()))?;
        tasks
            .into_iter()
            .find(|task| task.id == task_id)
            .ok_or_else(|| ConsoleError::UnknownTask(task_id.to_string()))
    }

    /// idle -> creating; returns the empty form to fill
    pub fn open_create(&self) -> Result<TaskForm> {
        let mut overlay = self.lock();
        Self::require_idle(&overlay, ConsoleAction::Create)?;
        let controller = TaskFormController::create(Arc::clone(&self.client));
        let form = controller.initial_form();
        *overlay = Overlay::Form(Arc::new(controller), None);
        Ok(form)
    }

    /// idle -> editing; returns the form pre-populated from the task
    pub fn open_edit(&self, task_id: &str) -> Result<TaskForm> {
        let mut overlay = self.lock();
        Self::require_idle(&overlay, ConsoleAction::Edit)?;
        let task = self.known_task(task_id)?;
        let controller = TaskFormController::edit(Arc::clone(&self.client), &task);
        let form = controller.initial_form();
        *overlay = Overlay::Form(Arc::new(controller), Some(task));
        Ok(form)
    }

    /// Mode of the open form, if any
    pub fn form_mode(&self) -> Option<FormMode> {
        match &*self.lock() {
            Overlay::Form(controller, _) => Some(controller.mode().clone()),
            _ => None,
        }
    }

    /// Submit the open form. On success the form closes and the list is
    /// refreshed; on failure the form stays open and the entered values come
    /// back in the rejection.
    pub async fn submit_form(
        &self,
        form: TaskForm,
    ) -> std::result::Result<Task, SubmitRejection> {
        let controller = match &*self.lock() {
            Overlay::Form(controller, _) => Arc::clone(controller),
            other => {
                return Err(SubmitRejection {
                    form,
                    error: ConsoleError::InvalidTransition {
                        state: other.view().label(),
                        action: ConsoleAction::Submit,
                    },
                });
            }
        };

        let is_edit = controller.mode().is_edit();
        match controller.submit(form).await {
            Ok(task) => {
                {
                    let mut overlay = self.lock();
                    // Only close the session this submit belongs to
                    let owned = match &*overlay {
                        Overlay::Form(open, _) => Arc::ptr_eq(open, &controller),
                        _ => false,
                    };
                    if owned {
                        *overlay = Overlay::Idle;
                    }
                }
                self.notifier.success(if is_edit {
                    "Task updated successfully!"
                } else {
                    "Task created successfully!"
                });
                self.refresh_after_mutation().await;
                Ok(task)
            }
            Err(rejection) => {
                // Rule violations go back to the caller only
                if rejection.error.is_remote() {
                    self.notifier.error(rejection.error.to_string());
                }
                Err(rejection)
            }
        }
    }

    /// idle -> viewing-history; refused when the task never ran
    pub fn open_history(&self, task_id: &str) -> Result<HistoryView> {
        let mut overlay = self.lock();
        Self::require_idle(&overlay, ConsoleAction::ShowHistory)?;
        let task = self.known_task(task_id)?;
        if !task.has_history() {
            return Err(ConsoleError::NoHistory {
                task_id: task.id.clone(),
            });
        }
        let history = self.projector.project(&task.task_executions);
        *overlay = Overlay::History(task, history.clone());
        Ok(history)
    }

    /// Project any execution list without opening an overlay
    pub fn project_history(&self, executions: &[TaskExecution]) -> HistoryView {
        self.projector.project(executions)
    }

    /// idle -> confirming-delete; nothing is sent yet
    pub fn request_delete(&self, task_id: &str) -> Result<()> {
        let mut overlay = self.lock();
        Self::require_idle(&overlay, ConsoleAction::RequestDelete)?;
        let task = self.known_task(task_id)?;
        *overlay = Overlay::ConfirmDelete(task.id);
        Ok(())
    }

    /// Issue the confirmed delete, then refresh on success
    pub async fn confirm_delete(&self) -> Result<()> {
        let task_id = match &*self.lock() {
            Overlay::ConfirmDelete(task_id) => task_id.clone(),
            other => {
                return Err(ConsoleError::InvalidTransition {
                    state: other.view().label(),
                    action: ConsoleAction::ConfirmDelete,
                });
            }
        };

        if self
            .deleting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ConsoleError::Busy("task delete".to_string()));
        }
        let result = {
            let _deleting = DeleteInFlight(&self.deleting);
            self.client.delete(&task_id).await
        };

        {
            let mut overlay = self.lock();
            if matches!(&*overlay, Overlay::ConfirmDelete(id) if *id == task_id) {
                *overlay = Overlay::Idle;
            }
        }

        match result {
            Ok(()) => {
                tracing::info!(task_id = %task_id, "task deleted");
                self.notifier.success("Task deleted successfully!");
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(err) => {
                let err = ConsoleError::remote(RemoteOperation::Delete, err);
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Close whatever overlay is open
    pub fn cancel(&self) {
        *self.lock() = Overlay::Idle;
    }

    /// Run a task. The busy indicator for `task_id` is set while the call is
    /// outstanding and cleared on every path; a second run of the same task
    /// meanwhile is refused.
    pub async fn execute(&self, task_id: &str) -> Result<TaskExecution> {
        let Some(permit) = self.guard.try_acquire(task_id) else {
            return Err(ConsoleError::Busy(format!("execution of {task_id}")));
        };

        tracing::debug!(task_id, "executing task");
        let result = self.client.execute(task_id).await;
        drop(permit);

        match result {
            Ok(execution) => {
                tracing::info!(
                    task_id,
                    duration_ms = execution.duration_ms(),
                    "task executed"
                );
                self.notifier.success("Task executed successfully!");
                self.refresh_after_mutation().await;
                Ok(execution)
            }
            Err(err) => {
                let err = ConsoleError::remote(RemoteOperation::Execute, err);
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    async fn refresh_after_mutation(&self) {
        // The mutation already succeeded; a failed reload is only reported
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "refresh after mutation failed");
        }
    }

    fn known_task(&self, task_id: &str) -> Result<Task> {
        self.store
            .task(task_id)
            .ok_or_else(|| ConsoleError::UnknownTask(task_id.to_string()))
    }

    fn require_idle(overlay: &Overlay<C>, action: ConsoleAction) -> Result<()> {
        match overlay {
            Overlay::Idle => Ok(()),
            other => Err(ConsoleError::InvalidTransition {
                state: other.view().label(),
                action,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Overlay<C>> {
        self.overlay.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the delete busy flag on every exit path
struct DeleteInFlight<'a>(&'a AtomicBool);

impl Drop for DeleteInFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
