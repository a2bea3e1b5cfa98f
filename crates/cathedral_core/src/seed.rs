//! Deterministic default state.
//!
//! # Responsibility
//! - Produce the fixed 17-block schedule and its 5 rhythm groups.
//! - Produce the sample tasks and notes shown on first run.
//!
//! # Invariants
//! - Block ids, order and rhythm references are identical on every call, so
//!   stored `RhythmGroup.blocks` and `Task.schedule_id` stay resolvable
//!   against a freshly generated template.
//! - The rhythm partitions the template over 24 hours with no gap and no
//!   overlap (`validate_rhythm_coverage`).

use crate::date::CalendarDate;
use crate::model::note::Note;
use crate::model::schedule::{RhythmGroup, ScheduleBlock};
use crate::model::state::AppState;
use crate::model::task::Task;
use chrono::{DateTime, SubsecRound, Utc};

/// The fixed daily template, ids `"1"` through `"17"`.
pub fn default_schedule() -> Vec<ScheduleBlock> {
    vec![
        ScheduleBlock::new("1", "4:00", "Meditation & Scripture"),
        ScheduleBlock::new("2", "5:00", "Workout"),
        ScheduleBlock::new("3", "6:00", "Creative Work"),
        ScheduleBlock::new("4", "7:00", "Breakfast"),
        ScheduleBlock::new("5", "8:00", "Projects"),
        ScheduleBlock::new("6", "10:00", "Break"),
        ScheduleBlock::new("7", "10:30", "Production"),
        ScheduleBlock::new("8", "12:00", "Lunch"),
        ScheduleBlock::new("9", "13:00", "Rest").locked(),
        ScheduleBlock::new("10", "15:00", "Analytical"),
        ScheduleBlock::new("11", "16:00", "Social"),
        ScheduleBlock::new("12", "17:00", "Family"),
        ScheduleBlock::new("13", "18:00", "Buffer"),
        ScheduleBlock::new("14", "19:00", "Learning"),
        ScheduleBlock::new("15", "20:00", "Wind Down"),
        ScheduleBlock::new("16", "21:00", "Reflection"),
        ScheduleBlock::new("17", "22:00", "Sleep").locked(),
    ]
}

/// The five display groupings over `default_schedule()`.
pub fn default_rhythm() -> Vec<RhythmGroup> {
    let group = |id: &str, time: &str, title: &str, blocks: &[&str]| RhythmGroup {
        id: id.to_string(),
        time: time.to_string(),
        title: title.to_string(),
        blocks: blocks.iter().map(|block| (*block).to_string()).collect(),
    };

    vec![
        group("sacred_launch", "4:00-7:00", "Sacred Launch", &["1", "2", "3"]),
        group(
            "mission_zones",
            "7:00-13:00",
            "Mission Zones",
            &["4", "5", "6", "7", "8"],
        ),
        group("restoration", "13:00-15:00", "Restoration", &["9"]),
        group(
            "engagement",
            "15:00-21:00",
            "Engagement",
            &["10", "11", "12", "13", "14", "15"],
        ),
        group("sanctuary", "21:00-4:00", "Sanctuary", &["16", "17"]),
    ]
}

/// Full first-run state with sample records dated `today` and `now`.
pub fn seed_state(today: CalendarDate, now: DateTime<Utc>, dark_mode: bool) -> AppState {
    let created_at = now.trunc_subsecs(3);
    let task = |id: &str, title: &str, minutes: u32, block: &str, completed: bool, notes: &str| {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            minutes,
            schedule_id: Some(block.to_string()),
            date: today,
            completed,
            notes: notes.to_string(),
        }
    };
    let note = |id: &str, content: &str| Note {
        id: id.to_string(),
        content: content.to_string(),
        created_at,
    };

    AppState {
        dark_mode,
        daily_schedule: default_schedule(),
        daily_rhythm: default_rhythm(),
        tasks: vec![
            task("task1", "Design homepage", 60, "5", false, "Focus on minimalist design"),
            task("task2", "Morning workout", 45, "2", true, ""),
            task("task3", "Meditation", 30, "1", false, ""),
        ],
        notes: vec![
            note("note1", "Best creative work after morning prayer."),
            note("note2", "Remember to stretch before workout."),
        ],
    }
}
