//! Field validation shared by task and note mutations.

use crate::date::DateParseError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection reason for caller-supplied task or note fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title is empty after trimming.
    EmptyTitle,
    /// Task duration must be at least one minute.
    ZeroMinutes,
    /// Task date is not a well-formed `YYYY-MM-DD` calendar day.
    InvalidDate(DateParseError),
    /// Note content is empty after trimming.
    EmptyContent,
}

impl ValidationError {
    /// Stable snake_case label for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::ZeroMinutes => "zero_minutes",
            Self::InvalidDate(_) => "invalid_date",
            Self::EmptyContent => "empty_content",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::ZeroMinutes => write!(f, "task duration must be greater than zero minutes"),
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::EmptyContent => write!(f, "note content must not be empty"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDate(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DateParseError> for ValidationError {
    fn from(value: DateParseError) -> Self {
        Self::InvalidDate(value)
    }
}

#[cfg(test)]
mod tests {
    use super::ValidationError;
    use crate::date::CalendarDate;

    #[test]
    fn code_omits_caller_text() {
        let err = ValidationError::from(CalendarDate::parse("2024-13-45 secret").unwrap_err());
        assert!(err.to_string().contains("secret"));
        assert_eq!(err.code(), "invalid_date");
        assert_eq!(ValidationError::EmptyTitle.code(), "empty_title");
        assert_eq!(ValidationError::EmptyContent.code(), "empty_content");
    }
}
