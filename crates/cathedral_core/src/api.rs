//! Shell-facing action API over the planner.
//!
//! # Responsibility
//! - Accept raw form input the way the UI collects it.
//! - Return a flat envelope with the notification text to show.
//!
//! # Invariants
//! - Functions here never panic and never return `Err`.
//! - `ActionResponse.message` is user-facing notification text.

use crate::model::task::{TaskDraft, TaskPatch};
use crate::model::validation::ValidationError;
use crate::service::planner::{Planner, PlannerError};
use crate::store::KeyValueStore;

/// Minutes used when the form's duration field is blank or unusable.
pub const DEFAULT_TASK_MINUTES: u32 = 60;

/// Raw task form fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub date: String,
    /// Empty string means "None" was picked.
    pub schedule_id: String,
    pub minutes: String,
    pub notes: String,
}

impl TaskForm {
    /// Leading whole minutes of the field, so `"90.5"` and `"45 min"` are read
    /// as 90 and 45. No digits, zero or overflow give the default.
    fn minutes(&self) -> u32 {
        let raw = self.minutes.trim_start();
        let raw = raw.strip_prefix('+').unwrap_or(raw);
        let digits_end = raw
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(raw.len());
        match raw[..digits_end].parse::<u32>() {
            Ok(0) | Err(_) => DEFAULT_TASK_MINUTES,
            Ok(value) => value,
        }
    }

    fn schedule_id(&self) -> Option<String> {
        let trimmed = self.schedule_id.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn missing_required(&self) -> bool {
        self.title.trim().is_empty() || self.date.trim().is_empty()
    }
}

/// Result envelope for one shell action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the action was applied.
    pub ok: bool,
    /// Id of the affected record, when there is one.
    pub id: Option<String>,
    /// Notification text.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

pub fn submit_new_task<S: KeyValueStore>(
    planner: &mut Planner<S>,
    form: &TaskForm,
) -> ActionResponse {
    if form.missing_required() {
        return ActionResponse::failure("Title and date required");
    }

    let mut draft = TaskDraft::new(form.title.as_str(), form.minutes(), form.date.as_str())
        .with_notes(form.notes.as_str());
    draft.schedule_id = form.schedule_id();

    match planner.add_task(draft) {
        Ok(task) => ActionResponse::success("Task added", Some(task.id)),
        Err(err) => failure_for(err),
    }
}

/// Applies every field of `form` to task `id`.
pub fn submit_task_edit<S: KeyValueStore>(
    planner: &mut Planner<S>,
    id: &str,
    form: &TaskForm,
) -> ActionResponse {
    if form.missing_required() {
        return ActionResponse::failure("Title and date required");
    }

    let patch = TaskPatch {
        title: Some(form.title.clone()),
        minutes: Some(form.minutes()),
        date: Some(form.date.clone()),
        schedule_id: Some(form.schedule_id()),
        notes: Some(form.notes.clone()),
        completed: None,
    };

    match planner.update_task(id, patch) {
        Ok(task) => ActionResponse::success("Task updated", Some(task.id)),
        Err(err) => failure_for(err),
    }
}

pub fn remove_task<S: KeyValueStore>(planner: &mut Planner<S>, id: &str) -> ActionResponse {
    planner.delete_task(id);
    ActionResponse::success("Task deleted", Some(id.to_string()))
}

pub fn toggle_task<S: KeyValueStore>(planner: &mut Planner<S>, id: &str) -> ActionResponse {
    match planner.toggle_task_completion(id) {
        Ok(task) if task.completed => ActionResponse::success("Completed ✓", Some(task.id)),
        Ok(task) => ActionResponse::success("Uncompleted", Some(task.id)),
        Err(err) => failure_for(err),
    }
}

pub fn submit_new_note<S: KeyValueStore>(
    planner: &mut Planner<S>,
    content: &str,
) -> ActionResponse {
    match planner.add_note(content) {
        Ok(note) => ActionResponse::success("Note saved", Some(note.id)),
        Err(err) => failure_for(err),
    }
}

pub fn submit_note_edit<S: KeyValueStore>(
    planner: &mut Planner<S>,
    id: &str,
    content: &str,
) -> ActionResponse {
    match planner.update_note(id, content) {
        Ok(note) => ActionResponse::success("Note updated", Some(note.id)),
        Err(err) => failure_for(err),
    }
}

pub fn remove_note<S: KeyValueStore>(planner: &mut Planner<S>, id: &str) -> ActionResponse {
    planner.delete_note(id);
    ActionResponse::success("Note deleted", Some(id.to_string()))
}

pub fn toggle_theme<S: KeyValueStore>(planner: &mut Planner<S>) -> ActionResponse {
    planner.toggle_dark_mode();
    ActionResponse::success("Theme changed", None)
}

fn failure_for(err: PlannerError) -> ActionResponse {
    let message = match &err {
        PlannerError::Validation(ValidationError::EmptyTitle) => {
            "Title and date required".to_string()
        }
        PlannerError::Validation(ValidationError::EmptyContent) => "Content required".to_string(),
        PlannerError::Validation(_) => err.to_string(),
        PlannerError::NotFound { .. } => err.to_string(),
    };
    ActionResponse::failure(message)
}
