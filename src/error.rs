use thiserror::Error;

use crate::schedule::ScheduleViolation;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to read or write CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to parse or write JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Roster row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: String },

    #[error("Person '{0}' appears more than once in the roster")]
    DuplicatePerson(String),

    #[error("Person '{person}' is listed but has no roster entry")]
    UnknownPerson { person: String },

    #[error("Person '{person}' has availability for slot {slot}, which is not a known time slot")]
    UnknownSlot { person: String, slot: String },

    #[error("Refusing to export a broken schedule: {0}")]
    InvalidSchedule(ScheduleViolation),
}

pub type Result<T> = std::result::Result<T, Error>;
