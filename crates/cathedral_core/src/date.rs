//! Calendar-day and time-of-day normalization helpers.
//!
//! # Responsibility
//! - Parse and format timezone-naive `YYYY-MM-DD` calendar days.
//! - Parse `H:MM` block start times and `H:MM-H:MM` rhythm ranges.
//!
//! # Invariants
//! - A calendar day is always built from year/month/day components, never
//!   from an instant, so no UTC shift can move it to a neighbouring day.
//! - `CalendarDate::parse(s)?.format() == s` for every accepted `s`.
//! - Parsing is strict: `2024-1-1` and `2023-02-29` are rejected.

use chrono::{Datelike, Local, NaiveDate, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Minutes in one full day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

static CALENDAR_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid calendar date regex")
});
static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("valid time-of-day regex"));

/// Error returned when a calendar day string cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// Input does not have the `YYYY-MM-DD` shape.
    InvalidFormat(String),
    /// Shape is right but the day does not exist (e.g. `2023-02-29`).
    InvalidCalendarDay { year: i32, month: u32, day: u32 },
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(value) => {
                write!(f, "invalid date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidCalendarDay { year, month, day } => {
                write!(f, "no such calendar day: {year:04}-{month:02}-{day:02}")
            }
        }
    }
}

impl Error for DateParseError {}

/// Error returned when a block time or rhythm range cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    /// Input is not `H:MM` or is out of the 0:00..23:59 range.
    InvalidTime(String),
    /// Input is not `H:MM-H:MM`.
    InvalidRange(String),
}

impl Display for TimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTime(value) => write!(f, "invalid time `{value}`; expected H:MM"),
            Self::InvalidRange(value) => {
                write!(f, "invalid time range `{value}`; expected H:MM-H:MM")
            }
        }
    }
}

impl Error for TimeParseError {}

/// A local calendar day with no time or timezone attached.
///
/// Serialized as the `YYYY-MM-DD` string used by the persisted blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Builds a day from its components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateParseError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(DateParseError::InvalidCalendarDay { year, month, day })
    }

    /// Parses a strict `YYYY-MM-DD` string.
    pub fn parse(value: &str) -> Result<Self, DateParseError> {
        let caps = CALENDAR_DATE_RE
            .captures(value)
            .ok_or_else(|| DateParseError::InvalidFormat(value.to_string()))?;

        let component = |index: usize| -> Result<u32, DateParseError> {
            caps[index]
                .parse::<u32>()
                .map_err(|_| DateParseError::InvalidFormat(value.to_string()))
        };
        let year = component(1)? as i32;
        let month = component(2)?;
        let day = component(3)?;

        Self::from_ymd(year, month, day)
    }

    /// Formats as zero-padded `YYYY-MM-DD`.
    pub fn format(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }

    /// Today's date on the local wall clock.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for CalendarDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Wall-clock minute within a day, written as `H:MM` (hour not padded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minute_of_day: u16,
}

impl TimeOfDay {
    /// Builds a time from hour (0..24) and minute (0..60).
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self {
            minute_of_day: hour * 60 + minute,
        })
    }

    /// Parses `H:MM` or `HH:MM`.
    pub fn parse(value: &str) -> Result<Self, TimeParseError> {
        let invalid = || TimeParseError::InvalidTime(value.to_string());
        let caps = TIME_OF_DAY_RE.captures(value.trim()).ok_or_else(invalid)?;
        let hour = caps[1].parse::<u16>().map_err(|_| invalid())?;
        let minute = caps[2].parse::<u16>().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }

    /// Current local wall-clock time, truncated to the minute.
    pub fn now_local() -> Self {
        let now = Local::now();
        Self {
            minute_of_day: (now.hour() * 60 + now.minute()) as u16,
        }
    }

    pub fn hour(&self) -> u16 {
        self.minute_of_day / 60
    }

    pub fn minute(&self) -> u16 {
        self.minute_of_day % 60
    }

    pub fn minute_of_day(&self) -> u16 {
        self.minute_of_day
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}", self.hour(), self.minute())
    }
}

/// Half-open `[start, end)` span on the 24-hour clock; may wrap past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeRange {
    /// Parses `H:MM-H:MM`, e.g. `21:00-4:00`.
    pub fn parse(value: &str) -> Result<Self, TimeParseError> {
        let (start, end) = value
            .split_once('-')
            .ok_or_else(|| TimeParseError::InvalidRange(value.to_string()))?;
        let start = TimeOfDay::parse(start)
            .map_err(|_| TimeParseError::InvalidRange(value.to_string()))?;
        let end =
            TimeOfDay::parse(end).map_err(|_| TimeParseError::InvalidRange(value.to_string()))?;
        Ok(Self { start, end })
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end <= self.start
    }

    /// Span length in minutes. Equal endpoints mean a full day.
    pub fn duration_minutes(&self) -> u16 {
        let start = self.start.minute_of_day();
        let end = self.end.minute_of_day();
        if end > start {
            end - start
        } else {
            MINUTES_PER_DAY - start + end
        }
    }

    pub fn contains(&self, time: TimeOfDay) -> bool {
        if self.wraps_midnight() {
            time >= self.start || time < self.end
        } else {
            time >= self.start && time < self.end
        }
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
