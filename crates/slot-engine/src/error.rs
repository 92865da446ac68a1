//! Error types for slot-engine operations.

use thiserror::Error;

use crate::conflict::Conflict;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Invalid schedule rule: {0}")]
    InvalidRule(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The store refused a write because the interval is already taken.
    #[error("Booking conflict: {} overlapping appointment(s)", conflicts.len())]
    Conflict { conflicts: Vec<Conflict> },

    #[error("Store error: {0}")]
    Store(String),
}

impl ClinicError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClinicError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClinicError>;
