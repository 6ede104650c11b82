//! Error types for the school calendar.

use thiserror::Error;

use crate::event::EventId;

/// Errors that can occur in calendar operations.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date '{value}' for {field}. Expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("End date {end} is before start date {start}")]
    InvalidDateRange { start: String, end: String },

    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("Unknown grade: {0}")]
    UnknownGrade(String),

    #[error("Invalid link '{0}'. Expected an http(s) URL")]
    InvalidLink(String),

    #[error("Invalid event id: {0}")]
    InvalidId(String),

    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CalendarError {
    /// Whether the error was caused by bad client input rather than the server.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CalendarError::MissingField(_)
                | CalendarError::InvalidDate { .. }
                | CalendarError::InvalidDateRange { .. }
                | CalendarError::UnknownEventType(_)
                | CalendarError::UnknownGrade(_)
                | CalendarError::InvalidLink(_)
                | CalendarError::InvalidId(_)
        )
    }
}

impl From<serde_json::Error> for CalendarError {
    fn from(err: serde_json::Error) -> Self {
        CalendarError::Serialization(err.to_string())
    }
}

/// Result type alias for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
