//! Error types for SLA calculations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlaError {
    #[error("Invalid SLA duration: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid datetime: {0}")]
    Parse(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Holiday lookup failed: {0}")]
    HolidayLookup(String),
}

pub type Result<T> = std::result::Result<T, SlaError>;
