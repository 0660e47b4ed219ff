//! Error types for ical-recur operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecurError {
    /// A date or date-time string did not match any accepted pattern.
    /// `position` is the byte offset where matching stopped.
    #[error("Invalid date-time '{value}' at position {position}")]
    InvalidTemporal { value: String, position: usize },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    /// A BYxxx (or INTERVAL/COUNT) value outside the legal range for the
    /// active calendar system.
    #[error("{part} value {value} out of range ({range})")]
    OutOfRange {
        part: &'static str,
        value: i64,
        range: String,
    },

    #[error("Unsupported RSCALE: {0}")]
    UnsupportedScale(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecurError>;
