//! Planner domain model.
//!
//! # Responsibility
//! - Define the persisted aggregate (`AppState`) and the entities it owns.
//! - Keep cross-entity references as plain ids resolved by lookup.
//!
//! # Invariants
//! - Task and note ids are unique within their collections.
//! - `Task.schedule_id` and `RhythmGroup.blocks` are weak references; a
//!   lookup miss means "unscheduled" or "skip", never a panic.

pub mod note;
pub mod schedule;
pub mod state;
pub mod task;
pub mod validation;
