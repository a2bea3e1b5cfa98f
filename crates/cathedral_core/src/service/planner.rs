//! Planner state model: the only sanctioned way to mutate `AppState`.
//!
//! # Responsibility
//! - Load the aggregate from storage once, falling back to the seed.
//! - Validate and apply task/note/theme mutations.
//! - Persist the whole aggregate after every mutation through `commit()`.
//!
//! # Invariants
//! - A rejected operation leaves the in-memory state unchanged.
//! - Storage failures never surface as operation errors; the state stays
//!   in memory and the next commit writes it again.
//! - Deleting an unknown id is a no-op.

use crate::date::{CalendarDate, TimeOfDay};
use crate::model::note::{normalized_content, Note, NoteId};
use crate::model::schedule::{RhythmGroup, ScheduleBlock};
use crate::model::state::{completion_ratio, AppState, CompletionRatio};
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::model::validation::ValidationError;
use crate::seed::seed_state;
use crate::service::day_plan::{block_at, day_plan, RhythmSection};
use crate::store::{KeyValueStore, PersistentStore};
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage key used when the caller does not configure one.
pub const DEFAULT_STORAGE_KEY: &str = "app_state";

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Entity family named in a not-found error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Note,
}

impl EntityKind {
    fn label(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Note => "note",
        }
    }
}

/// Error returned by planner mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    /// Caller input was rejected; state is unchanged.
    Validation(ValidationError),
    /// The referenced record does not exist.
    NotFound { kind: EntityKind, id: String },
}

impl PlannerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.label()),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<ValidationError> for PlannerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Load-time options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Key of the single storage slot holding the state blob.
    pub storage_key: String,
    /// Theme used when the seed has to be generated.
    pub prefers_dark: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            prefers_dark: false,
        }
    }
}

/// Owner of the in-memory `AppState` and its storage slot.
pub struct Planner<S: KeyValueStore> {
    store: PersistentStore<S>,
    options: PlannerOptions,
    state: AppState,
    unsaved: bool,
}

impl<S: KeyValueStore> Planner<S> {
    /// Loads state from `backend`, or seeds it when absent or malformed.
    ///
    /// Does not write anything; the first mutation persists the state.
    pub fn load(backend: S, options: PlannerOptions) -> Self {
        let store = PersistentStore::new(backend);
        let prefers_dark = options.prefers_dark;
        let fresh_seed = || seed_state(CalendarDate::today(), Utc::now(), prefers_dark);

        let loaded = store.load_or_else(&options.storage_key, || None::<AppState>);
        let state = match loaded {
            Some(state) => match state.check_integrity() {
                Ok(()) => {
                    info!(
                        "event=state_load module=planner status=ok source=storage tasks={} notes={}",
                        state.tasks.len(),
                        state.notes.len()
                    );
                    state
                }
                Err(err) => {
                    warn!(
                        "event=state_load module=planner status=fallback source=seed reason=integrity check={}",
                        err.code()
                    );
                    fresh_seed()
                }
            },
            None => {
                info!("event=state_load module=planner status=ok source=seed");
                fresh_seed()
            }
        };

        Self {
            store,
            options,
            state,
            unsaved: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    /// Notes, newest first.
    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    pub fn schedule(&self) -> &[ScheduleBlock] {
        &self.state.daily_schedule
    }

    pub fn rhythm(&self) -> &[RhythmGroup] {
        &self.state.daily_rhythm
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.state.task(id)
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.state.note(id)
    }

    pub fn storage_key(&self) -> &str {
        &self.options.storage_key
    }

    pub fn backend(&self) -> &S {
        self.store.backend()
    }

    pub fn backend_mut(&mut self) -> &mut S {
        self.store.backend_mut()
    }

    /// `true` when the last commit failed and the stored blob is stale.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Writes the whole state to storage. Returns whether the write succeeded.
    pub fn commit(&mut self) -> bool {
        match self.store.save(&self.options.storage_key, &self.state) {
            Ok(()) => {
                if self.unsaved {
                    info!("event=state_commit module=planner status=recovered");
                }
                self.unsaved = false;
                true
            }
            Err(err) => {
                warn!("event=state_commit module=planner status=error error={err}");
                self.unsaved = true;
                false
            }
        }
    }

    /// Clears the stored slot, then replaces everything with a fresh seed and
    /// persists it.
    ///
    /// If the slot cannot be cleared the seed is still committed over it.
    pub fn reset_to_defaults(&mut self) {
        if let Err(err) = self.store.remove(&self.options.storage_key) {
            warn!("event=state_reset module=planner status=error step=remove error={err}");
        }
        self.state = seed_state(CalendarDate::today(), Utc::now(), self.options.prefers_dark);
        info!("event=state_reset module=planner status=ok");
        self.commit();
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> PlannerResult<Task> {
        let id = self.fresh_task_id();
        let task = draft.into_task(id).inspect_err(|err| {
            info!("event=task_add module=planner status=rejected reason={}", err.code());
        })?;

        self.state.tasks.push(task.clone());
        info!(
            "event=task_add module=planner status=ok task_id={} date={}",
            task.id, task.date
        );
        self.commit();
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> PlannerResult<Task> {
        let current = self
            .state
            .task_mut(id)
            .ok_or_else(|| PlannerError::not_found(EntityKind::Task, id))?;
        let merged = patch.apply_to(current).inspect_err(|err| {
            info!(
                "event=task_update module=planner status=rejected task_id={id} reason={}",
                err.code()
            );
        })?;
        *current = merged.clone();

        info!("event=task_update module=planner status=ok task_id={id}");
        self.commit();
        Ok(merged)
    }

    pub fn delete_task(&mut self, id: &str) {
        let before = self.state.tasks.len();
        self.state.tasks.retain(|task| task.id != id);
        if self.state.tasks.len() == before {
            info!("event=task_delete module=planner status=noop task_id={id}");
            return;
        }

        info!("event=task_delete module=planner status=ok task_id={id}");
        self.commit();
    }

    pub fn toggle_task_completion(&mut self, id: &str) -> PlannerResult<Task> {
        let task = self
            .state
            .task_mut(id)
            .ok_or_else(|| PlannerError::not_found(EntityKind::Task, id))?;
        task.completed = !task.completed;
        let toggled = task.clone();

        info!(
            "event=task_toggle module=planner status=ok task_id={id} completed={}",
            toggled.completed
        );
        self.commit();
        Ok(toggled)
    }

    pub fn add_note(&mut self, content: &str) -> PlannerResult<Note> {
        let id = self.fresh_note_id();
        let note = Note::new(id, content, Utc::now()).inspect_err(|err| {
            info!("event=note_add module=planner status=rejected reason={}", err.code());
        })?;

        self.state.notes.insert(0, note.clone());
        info!("event=note_add module=planner status=ok note_id={}", note.id);
        self.commit();
        Ok(note)
    }

    pub fn update_note(&mut self, id: &str, content: &str) -> PlannerResult<Note> {
        let note = self
            .state
            .note_mut(id)
            .ok_or_else(|| PlannerError::not_found(EntityKind::Note, id))?;
        note.content = normalized_content(content)?;
        let updated = note.clone();

        info!("event=note_update module=planner status=ok note_id={id}");
        self.commit();
        Ok(updated)
    }

    pub fn delete_note(&mut self, id: &str) {
        let before = self.state.notes.len();
        self.state.notes.retain(|note| note.id != id);
        if self.state.notes.len() == before {
            info!("event=note_delete module=planner status=noop note_id={id}");
            return;
        }

        info!("event=note_delete module=planner status=ok note_id={id}");
        self.commit();
    }

    pub fn dark_mode(&self) -> bool {
        self.state.dark_mode
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.state.dark_mode = dark_mode;
        info!("event=theme_set module=planner status=ok dark_mode={dark_mode}");
        self.commit();
    }

    /// Flips the theme flag and returns the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        let next = !self.state.dark_mode;
        self.set_dark_mode(next);
        next
    }

    pub fn tasks_for_date(&self, date: CalendarDate) -> Vec<&Task> {
        self.state.tasks_for_date(date)
    }

    pub fn tasks_for_schedule_and_date(&self, schedule_id: &str, date: CalendarDate) -> Vec<&Task> {
        self.state.tasks_for_schedule_and_date(schedule_id, date)
    }

    pub fn unscheduled_tasks_for_date(&self, date: CalendarDate) -> Vec<&Task> {
        self.state.unscheduled_tasks_for_date(date)
    }

    pub fn completion_ratio<'a>(
        &self,
        tasks: impl IntoIterator<Item = &'a Task>,
    ) -> CompletionRatio {
        completion_ratio(tasks)
    }

    pub fn schedule_block(&self, id: &str) -> Option<&ScheduleBlock> {
        self.state.schedule_block(id)
    }

    pub fn schedule_block_for(&self, task: &Task) -> Option<&ScheduleBlock> {
        self.state.schedule_block_for(task)
    }

    pub fn day_plan(&self, date: CalendarDate) -> Vec<RhythmSection<'_>> {
        day_plan(&self.state, date)
    }

    pub fn block_at(&self, time: TimeOfDay) -> Option<&ScheduleBlock> {
        block_at(&self.state, time)
    }

    /// Block active at the local wall-clock time.
    pub fn current_block(&self) -> Option<&ScheduleBlock> {
        self.block_at(TimeOfDay::now_local())
    }

    fn fresh_task_id(&self) -> TaskId {
        loop {
            let id = format!("task_{}", Uuid::new_v4().simple());
            if !self.state.contains_task_id(&id) {
                return id;
            }
        }
    }

    fn fresh_note_id(&self) -> NoteId {
        loop {
            let id = format!("note_{}", Uuid::new_v4().simple());
            if !self.state.contains_note_id(&id) {
                return id;
            }
        }
    }
}
