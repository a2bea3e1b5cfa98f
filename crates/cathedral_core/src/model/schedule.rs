//! Daily schedule template: time blocks and the rhythm groups over them.
//!
//! # Responsibility
//! - Define the fixed 24-hour block template and its display groupings.
//! - Verify that a rhythm partitions the template across the whole day.
//!
//! # Invariants
//! - `ScheduleBlock.locked` is informational; nothing in core enforces it.
//! - `RhythmGroup.blocks` order is display order and is preserved as stored.
//! - A block id in `RhythmGroup.blocks` may dangle; resolution skips it.

use crate::date::{TimeOfDay, TimeParseError, TimeRange, MINUTES_PER_DAY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of one block in the daily template.
pub type BlockId = String;

/// One fixed slot in the recurring daily template, e.g. `4:00 Meditation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub id: BlockId,
    /// Start time as `H:MM`.
    pub time: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

impl ScheduleBlock {
    pub fn new(id: impl Into<String>, time: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time: time.into(),
            title: title.into(),
            locked: false,
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn start_time(&self) -> Result<TimeOfDay, TimeParseError> {
        TimeOfDay::parse(&self.time)
    }
}

/// Named, ordered grouping of blocks, e.g. `Sacred Launch 4:00-7:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhythmGroup {
    pub id: String,
    /// Covered span as `H:MM-H:MM`; may wrap past midnight.
    pub time: String,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<BlockId>,
}

impl RhythmGroup {
    pub fn range(&self) -> Result<TimeRange, TimeParseError> {
        TimeRange::parse(&self.time)
    }
}

/// Reason a rhythm does not partition the schedule over a full day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RhythmCoverageError {
    NoGroups,
    InvalidTime(TimeParseError),
    DanglingBlock { group_id: String, block_id: BlockId },
    BlockInMultipleGroups(BlockId),
    UnassignedBlock(BlockId),
    BlockOutsideGroup { group_id: String, block_id: BlockId },
    Gap { after_group: String, next_group: String },
    IncompleteCycle { covered_minutes: u32 },
}

impl Display for RhythmCoverageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoGroups => write!(f, "rhythm has no groups"),
            Self::InvalidTime(err) => write!(f, "{err}"),
            Self::DanglingBlock { group_id, block_id } => {
                write!(f, "group `{group_id}` references unknown block `{block_id}`")
            }
            Self::BlockInMultipleGroups(id) => {
                write!(f, "block `{id}` belongs to more than one group")
            }
            Self::UnassignedBlock(id) => write!(f, "block `{id}` belongs to no group"),
            Self::BlockOutsideGroup { group_id, block_id } => write!(
                f,
                "block `{block_id}` starts outside the range of group `{group_id}`"
            ),
            Self::Gap {
                after_group,
                next_group,
            } => write!(
                f,
                "group `{after_group}` does not end where `{next_group}` begins"
            ),
            Self::IncompleteCycle { covered_minutes } => write!(
                f,
                "rhythm covers {covered_minutes} minutes instead of {MINUTES_PER_DAY}"
            ),
        }
    }
}

impl Error for RhythmCoverageError {}

impl From<TimeParseError> for RhythmCoverageError {
    fn from(value: TimeParseError) -> Self {
        Self::InvalidTime(value)
    }
}

/// Checks that `rhythm` partitions `schedule` with no gap and no overlap.
///
/// Every block must belong to exactly one group and start inside that
/// group's range; consecutive group ranges must touch (the last wrapping to
/// the first) and add up to exactly 24 hours.
pub fn validate_rhythm_coverage(
    schedule: &[ScheduleBlock],
    rhythm: &[RhythmGroup],
) -> Result<(), RhythmCoverageError> {
    if rhythm.is_empty() {
        return Err(RhythmCoverageError::NoGroups);
    }

    let blocks_by_id: HashMap<&str, &ScheduleBlock> = schedule
        .iter()
        .map(|block| (block.id.as_str(), block))
        .collect();
    let mut owner: HashMap<&str, &str> = HashMap::new();
    let mut ranges = Vec::with_capacity(rhythm.len());

    for group in rhythm {
        let range = group.range()?;
        for block_id in &group.blocks {
            let block = blocks_by_id.get(block_id.as_str()).ok_or_else(|| {
                RhythmCoverageError::DanglingBlock {
                    group_id: group.id.clone(),
                    block_id: block_id.clone(),
                }
            })?;
            if owner.insert(block_id.as_str(), group.id.as_str()).is_some() {
                return Err(RhythmCoverageError::BlockInMultipleGroups(block_id.clone()));
            }
            if !range.contains(block.start_time()?) {
                return Err(RhythmCoverageError::BlockOutsideGroup {
                    group_id: group.id.clone(),
                    block_id: block_id.clone(),
                });
            }
        }
        ranges.push((group.id.as_str(), range));
    }

    if let Some(block) = schedule
        .iter()
        .find(|block| !owner.contains_key(block.id.as_str()))
    {
        return Err(RhythmCoverageError::UnassignedBlock(block.id.clone()));
    }

    for (index, (group_id, range)) in ranges.iter().enumerate() {
        let (next_id, next_range) = &ranges[(index + 1) % ranges.len()];
        if range.end != next_range.start {
            return Err(RhythmCoverageError::Gap {
                after_group: (*group_id).to_string(),
                next_group: (*next_id).to_string(),
            });
        }
    }

    let covered_minutes: u32 = ranges
        .iter()
        .map(|(_, range)| u32::from(range.duration_minutes()))
        .sum();
    if covered_minutes != u32::from(MINUTES_PER_DAY) {
        return Err(RhythmCoverageError::IncompleteCycle { covered_minutes });
    }

    Ok(())
}
