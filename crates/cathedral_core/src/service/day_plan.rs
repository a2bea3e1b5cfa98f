//! Read-side projections for the daily flow view.
//!
//! Everything here is pure: it borrows `AppState` and never mutates it.

use crate::date::{CalendarDate, TimeOfDay};
use crate::model::schedule::{RhythmGroup, ScheduleBlock};
use crate::model::state::{completion_ratio, AppState, CompletionRatio};
use crate::model::task::Task;

/// One block of the template with the tasks planned in it for a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPlan<'a> {
    pub block: &'a ScheduleBlock,
    pub tasks: Vec<&'a Task>,
    pub progress: CompletionRatio,
}

/// One rhythm group with its resolved blocks, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhythmSection<'a> {
    pub group: &'a RhythmGroup,
    pub blocks: Vec<BlockPlan<'a>>,
}

impl RhythmSection<'_> {
    /// Progress summed over every block in the section.
    pub fn progress(&self) -> CompletionRatio {
        completion_ratio(self.blocks.iter().flat_map(|plan| plan.tasks.iter().copied()))
    }
}

/// Builds the flow view for `date`. Dangling block ids are skipped.
pub fn day_plan(state: &AppState, date: CalendarDate) -> Vec<RhythmSection<'_>> {
    state
        .daily_rhythm
        .iter()
        .map(|group| RhythmSection {
            group,
            blocks: state
                .rhythm_blocks(group)
                .map(|block| {
                    let tasks = state.tasks_for_schedule_and_date(&block.id, date);
                    let progress = completion_ratio(tasks.iter().copied());
                    BlockPlan {
                        block,
                        tasks,
                        progress,
                    }
                })
                .collect(),
        })
        .collect()
}

/// Block active at `time`: the latest block starting at or before it, or the
/// last block of the day when `time` is earlier than every start.
///
/// Blocks whose `time` does not parse are ignored.
pub fn block_at(state: &AppState, time: TimeOfDay) -> Option<&ScheduleBlock> {
    let timed = state
        .daily_schedule
        .iter()
        .filter_map(|block| block.start_time().ok().map(|start| (start, block)));

    let mut latest_before: Option<(TimeOfDay, &ScheduleBlock)> = None;
    let mut latest_overall: Option<(TimeOfDay, &ScheduleBlock)> = None;
    for (start, block) in timed {
        if latest_overall.map_or(true, |(best, _)| start > best) {
            latest_overall = Some((start, block));
        }
        if start <= time && latest_before.map_or(true, |(best, _)| start > best) {
            latest_before = Some((start, block));
        }
    }

    latest_before.or(latest_overall).map(|(_, block)| block)
}
