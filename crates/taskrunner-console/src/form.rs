/*
[INPUT]:  TaskForm values entered by the user, TaskApi client
[OUTPUT]: Validated CreateTaskRequest upserts or the untouched form with the error
[POS]:    Task form controller - create/edit validation and single-flight submit
[UPDATE]: When form fields or validation rules change
*/

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use taskrunner_adapter::{CreateTaskRequest, Task, TaskApi};

use crate::error::{ConsoleError, RemoteOperation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Id,
    Name,
    Owner,
    Command,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Id,
        FormField::Name,
        FormField::Owner,
        FormField::Command,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Id => "Task ID",
            FormField::Name => "Task Name",
            FormField::Owner => "Owner",
            FormField::Command => "Command",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// Field-scoped validation failures, in field order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: FormField, message: &str) {
        self.errors.push(FieldError {
            field,
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First message for `field`, if it failed
    pub fn message_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Whether the form creates a new task or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing pins the id of the task being edited
    Edit { task_id: String },
}

impl FormMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit { .. })
    }
}

/// Values entered into the task form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskForm {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub command: String,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            owner: task.owner.clone(),
            command: task.command.clone(),
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Id => &self.id,
            FormField::Name => &self.name,
            FormField::Owner => &self.owner,
            FormField::Command => &self.command,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Id => self.id = value,
            FormField::Name => self.name = value,
            FormField::Owner => self.owner = value,
            FormField::Command => self.command = value,
        }
    }

    /// Check every field and build the request body
    pub fn validate(&self, mode: &FormMode) -> Result<CreateTaskRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.id.trim().is_empty() {
            errors.push(FormField::Id, "Please enter task ID");
        } else if !is_valid_task_id(&self.id) {
            errors.push(
                FormField::Id,
                "ID can only contain letters, numbers, hyphens, and underscores",
            );
        } else if let FormMode::Edit { task_id } = mode {
            if *task_id != self.id {
                errors.push(FormField::Id, "Task ID cannot be changed");
            }
        }
        if self.name.trim().is_empty() {
            errors.push(FormField::Name, "Please enter task name");
        }
        if self.owner.trim().is_empty() {
            errors.push(FormField::Owner, "Please enter owner name");
        }
        if self.command.trim().is_empty() {
            errors.push(FormField::Command, "Please enter command");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CreateTaskRequest {
            id: self.id.clone(),
            name: self.name.clone(),
            owner: self.owner.clone(),
            command: self.command.clone(),
        })
    }
}

/// `[a-zA-Z0-9_-]+`
pub fn is_valid_task_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

/// A failed submit hands the entered values back untouched
#[derive(Debug)]
pub struct SubmitRejection {
    pub form: TaskForm,
    pub error: ConsoleError,
}

/// Controller for one create/edit form session
pub struct TaskFormController<C: ?Sized> {
    client: Arc<C>,
    mode: FormMode,
    initial: TaskForm,
    busy: AtomicBool,
}

impl<C: TaskApi + ?Sized> TaskFormController<C> {
    /// Session starting from an empty form
    pub fn create(client: Arc<C>) -> Self {
        Self {
            client,
            mode: FormMode::Create,
            initial: TaskForm::new(),
            busy: AtomicBool::new(false),
        }
    }

    /// Session pre-populated from `task`
    pub fn edit(client: Arc<C>, task: &Task) -> Self {
        Self {
            client,
            mode: FormMode::Edit {
                task_id: task.id.clone(),
            },
            initial: TaskForm::from_task(task),
            busy: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Values the form opens with
    pub fn initial_form(&self) -> TaskForm {
        self.initial.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Validate and upsert. Nothing is sent when validation fails; a second
    /// submit while one is outstanding is refused.
    pub async fn submit(&self, form: TaskForm) -> Result<Task, SubmitRejection> {
        let request = match form.validate(&self.mode) {
            Ok(request) => request,
            Err(errors) => {
                return Err(SubmitRejection {
                    form,
                    error: ConsoleError::Validation(errors),
                });
            }
        };

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitRejection {
                form,
                error: ConsoleError::Busy("task save".to_string()),
            });
        }
        let _busy = BusyFlag(&self.busy);

        tracing::debug!(task_id = %request.id, edit = self.mode.is_edit(), "submitting task form");
        match self.client.upsert(&request).await {
            Ok(task) => {
                tracing::info!(task_id = %task.id, "task saved");
                Ok(task)
            }
            Err(err) => Err(SubmitRejection {
                form,
                error: ConsoleError::remote(RemoteOperation::Upsert, err),
            }),
        }
    }
}

impl<C: ?Sized> fmt::Debug for TaskFormController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFormController")
            .field("mode", &self.mode)
            .field("busy", &self.busy.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

struct BusyFlag<'a>(&'a AtomicBool);

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
