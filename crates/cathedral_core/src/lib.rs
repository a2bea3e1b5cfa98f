//! Core state model for the Cathedral daily planner.
//! This crate is the single source of truth for planner invariants: the
//! schedule template, tasks, notes and their persisted form.

pub mod api;
pub mod config;
pub mod date;
pub mod db;
pub mod logging;
pub mod model;
pub mod seed;
pub mod service;
pub mod store;

pub use config::{BootstrapError, CoreConfig};
pub use date::{CalendarDate, DateParseError, TimeOfDay, TimeParseError, TimeRange};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId};
pub use model::schedule::{
    validate_rhythm_coverage, BlockId, RhythmCoverageError, RhythmGroup, ScheduleBlock,
};
pub use model::state::{completion_ratio, AppState, CompletionRatio, StateIntegrityError};
pub use model::task::{Task, TaskDraft, TaskId, TaskPatch};
pub use model::validation::ValidationError;
pub use seed::seed_state;
pub use service::day_plan::{BlockPlan, RhythmSection};
pub use service::planner::{
    EntityKind, Planner, PlannerError, PlannerOptions, PlannerResult, DEFAULT_STORAGE_KEY,
};
pub use store::{
    KeyValueStore, MemoryKvStore, PersistentStore, SqliteKvStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
