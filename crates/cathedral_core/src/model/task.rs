//! Task entity and its create/patch request shapes.
//!
//! # Responsibility
//! - Define the persisted task record attached to a calendar day.
//! - Normalize and validate caller input before it reaches the collection.
//!
//! # Invariants
//! - `title` is non-empty after trimming.
//! - `minutes` is greater than zero.
//! - `date` is a local calendar day, never an instant.
//! - `schedule_id` is a weak reference; it may point at no block.

use crate::date::CalendarDate;
use crate::model::schedule::BlockId;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};

/// Stable task identifier, unique within the task collection.
pub type TaskId = String;

/// User-created unit of work attached to a date and optionally a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Planned duration in minutes. Serialized as `time`.
    #[serde(rename = "time")]
    pub minutes: u32,
    #[serde(default)]
    pub schedule_id: Option<BlockId>,
    pub date: CalendarDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

impl Task {
    /// Checks the field-level invariants of an already-built task.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.minutes == 0 {
            return Err(ValidationError::ZeroMinutes);
        }
        Ok(())
    }

    pub fn is_scheduled_in(&self, block_id: &str) -> bool {
        self.schedule_id.as_deref() == Some(block_id)
    }
}

/// Input for creating a task. `date` is raw caller text, validated on add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub minutes: u32,
    pub date: String,
    pub schedule_id: Option<BlockId>,
    pub notes: String,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, minutes: u32, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            minutes,
            date: date.into(),
            schedule_id: None,
            notes: String::new(),
        }
    }

    pub fn scheduled_in(mut self, block_id: impl Into<String>) -> Self {
        self.schedule_id = Some(block_id.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Builds the task record under `id`, or reports the first invalid field.
    pub(crate) fn into_task(self, id: TaskId) -> Result<Task, ValidationError> {
        let title = normalized_title(&self.title)?;
        let minutes = normalized_minutes(self.minutes)?;
        let date = CalendarDate::parse(self.date.trim())?;
        Ok(Task {
            id,
            title,
            minutes,
            schedule_id: normalized_schedule_id(self.schedule_id),
            date,
            completed: false,
            notes: self.notes.trim().to_string(),
        })
    }
}

/// Partial update for an existing task. `None` leaves a field untouched.
///
/// `schedule_id: Some(None)` clears the block assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub minutes: Option<u32>,
    pub date: Option<String>,
    pub schedule_id: Option<Option<BlockId>>,
    pub notes: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Returns `task` with this patch merged in, or the first invalid field.
    ///
    /// The input task is not modified, so a rejected patch leaves no trace.
    pub(crate) fn apply_to(&self, task: &Task) -> Result<Task, ValidationError> {
        let mut merged = task.clone();
        if let Some(title) = &self.title {
            merged.title = normalized_title(title)?;
        }
        if let Some(minutes) = self.minutes {
            merged.minutes = normalized_minutes(minutes)?;
        }
        if let Some(date) = &self.date {
            merged.date = CalendarDate::parse(date.trim())?;
        }
        if let Some(schedule_id) = &self.schedule_id {
            merged.schedule_id = normalized_schedule_id(schedule_id.clone());
        }
        if let Some(notes) = &self.notes {
            merged.notes = notes.trim().to_string();
        }
        if let Some(completed) = self.completed {
            merged.completed = completed;
        }
        Ok(merged)
    }
}

fn normalized_title(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn normalized_minutes(minutes: u32) -> Result<u32, ValidationError> {
    if minutes == 0 {
        return Err(ValidationError::ZeroMinutes);
    }
    Ok(minutes)
}

// An empty selection from the block picker means "unscheduled".
fn normalized_schedule_id(raw: Option<BlockId>) -> Option<BlockId> {
    raw.map(|id| id.trim().to_string()).filter(|id| !id.is_empty())
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskDraft, TaskPatch};
    use crate::date::CalendarDate;
    use crate::model::validation::ValidationError;

    fn sample_task() -> Task {
        TaskDraft::new("Design homepage", 60, "2024-01-01")
            .scheduled_in("5")
            .into_task("task1".to_string())
            .unwrap()
    }

    #[test]
    fn draft_trims_fields_and_defaults_completion() {
        let task = TaskDraft::new("  Stretch  ", 15, "2024-05-06")
            .scheduled_in("  ")
            .with_notes(" before workout ")
            .into_task("t".to_string())
            .unwrap();
        assert_eq!(task.title, "Stretch");
        assert_eq!(task.notes, "before workout");
        assert_eq!(task.schedule_id, None);
        assert!(!task.completed);
        assert_eq!(task.date, CalendarDate::from_ymd(2024, 5, 6).unwrap());
    }

    #[test]
    fn draft_rejects_empty_title_zero_minutes_and_bad_date() {
        let err = TaskDraft::new("   ", 30, "2024-01-01")
            .into_task("t".to_string())
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);

        let err = TaskDraft::new("Read", 0, "2024-01-01")
            .into_task("t".to_string())
            .unwrap_err();
        assert_eq!(err, ValidationError::ZeroMinutes);

        let err = TaskDraft::new("Read", 30, "01/02/2024")
            .into_task("t".to_string())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDate(_)));
    }

    #[test]
    fn patch_merges_only_provided_fields() {
        let task = sample_task();
        let patch = TaskPatch {
            minutes: Some(90),
            schedule_id: Some(None),
            ..TaskPatch::default()
        };
        let merged = patch.apply_to(&task).unwrap();
        assert_eq!(merged.minutes, 90);
        assert_eq!(merged.schedule_id, None);
        assert_eq!(merged.title, task.title);
        assert_eq!(merged.date, task.date);
    }

    #[test]
    fn wire_shape_uses_camel_case_and_time_for_minutes() {
        let json = serde_json::to_value(sample_task()).unwrap();
        assert_eq!(json["time"], 60);
        assert_eq!(json["scheduleId"], "5");
        assert_eq!(json["date"], "2024-01-01");
        assert!(json.get("minutes").is_none());
    }

    #[test]
    fn missing_and_null_optional_fields_take_defaults() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "legacy",
            "title": "Old task",
            "time": 30,
            "date": "2024-02-29",
            "notes": null
        }))
        .unwrap();
        assert_eq!(task.schedule_id, None);
        assert!(!task.completed);
        assert_eq!(task.notes, "");
    }
}
