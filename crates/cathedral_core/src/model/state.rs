//! `AppState`: the single persisted aggregate.
//!
//! # Responsibility
//! - Own the schedule template, rhythm groups, tasks, notes and theme flag.
//! - Provide pure lookups and date/block filters used by every view.
//! - Decide whether a loaded blob is well-formed enough to adopt.
//!
//! # Invariants
//! - Persisted as one JSON object with camelCase field names.
//! - Missing fields default (`darkMode=false`, seed schedule/rhythm, empty
//!   task and note collections); nothing else is migrated.
//! - Queries return tasks in storage (insertion) order.

use crate::date::CalendarDate;
use crate::model::note::Note;
use crate::model::schedule::{RhythmGroup, ScheduleBlock};
use crate::model::task::Task;
use crate::model::validation::ValidationError;
use crate::seed::{default_rhythm, default_schedule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_schedule")]
    pub daily_schedule: Vec<ScheduleBlock>,
    #[serde(default = "default_rhythm")]
    pub daily_rhythm: Vec<RhythmGroup>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Newest first.
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Completed/total counts shown next to every task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionRatio {
    pub completed: usize,
    pub total: usize,
}

impl CompletionRatio {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Display for CompletionRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)
    }
}

/// Counts completed tasks among `tasks`.
pub fn completion_ratio<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> CompletionRatio {
    tasks
        .into_iter()
        .fold(CompletionRatio::default(), |mut ratio, task| {
            ratio.total += 1;
            if task.completed {
                ratio.completed += 1;
            }
            ratio
        })
}

/// Reason a loaded state cannot be adopted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateIntegrityError {
    DuplicateTaskId(String),
    DuplicateNoteId(String),
    DuplicateBlockId(String),
    InvalidTask { id: String, reason: ValidationError },
    EmptyNote(String),
}

impl StateIntegrityError {
    /// Snake_case label for log lines; carries no stored text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateTaskId(_) => "duplicate_task_id",
            Self::DuplicateNoteId(_) => "duplicate_note_id",
            Self::DuplicateBlockId(_) => "duplicate_block_id",
            Self::InvalidTask { reason, .. } => reason.code(),
            Self::EmptyNote(_) => "empty_note",
        }
    }
}

impl Display for StateIntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTaskId(id) => write!(f, "duplicate task id `{id}`"),
            Self::DuplicateNoteId(id) => write!(f, "duplicate note id `{id}`"),
            Self::DuplicateBlockId(id) => write!(f, "duplicate schedule block id `{id}`"),
            Self::InvalidTask { id, reason } => write!(f, "invalid task `{id}`: {reason}"),
            Self::EmptyNote(id) => write!(f, "note `{id}` has empty content"),
        }
    }
}

impl Error for StateIntegrityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl AppState {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub(crate) fn note_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    pub fn schedule_block(&self, id: &str) -> Option<&ScheduleBlock> {
        self.daily_schedule.iter().find(|block| block.id == id)
    }

    /// Block a task is scheduled in; `None` means unscheduled, including when
    /// the referenced block no longer exists.
    pub fn schedule_block_for(&self, task: &Task) -> Option<&ScheduleBlock> {
        task.schedule_id
            .as_deref()
            .and_then(|id| self.schedule_block(id))
    }

    /// Resolves a group's block ids in order, skipping ids with no block.
    pub fn rhythm_blocks<'a>(
        &'a self,
        group: &'a RhythmGroup,
    ) -> impl Iterator<Item = &'a ScheduleBlock> + 'a {
        group
            .blocks
            .iter()
            .filter_map(move |id| self.schedule_block(id))
    }

    pub fn tasks_for_date(&self, date: CalendarDate) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.date == date).collect()
    }

    pub fn tasks_for_schedule_and_date(&self, schedule_id: &str, date: CalendarDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.date == date && task.is_scheduled_in(schedule_id))
            .collect()
    }

    /// Tasks on `date` with no block, or whose block no longer resolves.
    pub fn unscheduled_tasks_for_date(&self, date: CalendarDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.date == date && self.schedule_block_for(task).is_none())
            .collect()
    }

    pub(crate) fn contains_task_id(&self, id: &str) -> bool {
        self.task(id).is_some()
    }

    pub(crate) fn contains_note_id(&self, id: &str) -> bool {
        self.note(id).is_some()
    }

    /// Checks id uniqueness and per-record invariants of a loaded state.
    pub fn check_integrity(&self) -> Result<(), StateIntegrityError> {
        let mut seen = HashSet::new();
        for block in &self.daily_schedule {
            if !seen.insert(block.id.as_str()) {
                return Err(StateIntegrityError::DuplicateBlockId(block.id.clone()));
            }
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(StateIntegrityError::DuplicateTaskId(task.id.clone()));
            }
            task.validate()
                .map_err(|reason| StateIntegrityError::InvalidTask {
                    id: task.id.clone(),
                    reason,
                })?;
        }

        let mut seen = HashSet::new();
        for note in &self.notes {
            if !seen.insert(note.id.as_str()) {
                return Err(StateIntegrityError::DuplicateNoteId(note.id.clone()));
            }
            if note.content.trim().is_empty() {
                return Err(StateIntegrityError::EmptyNote(note.id.clone()));
            }
        }

        Ok(())
    }
}
