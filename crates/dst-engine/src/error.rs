//! Error types for dst-engine operations.
//!
//! Only malformed input is an error. A zone that never transitions, or has no
//! rule for the requested year, is reported as an absent value instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DstError {
    #[error("Invalid transition rule: {0}")]
    InvalidRule(String),

    #[error("Invalid adjustment rule: {0}")]
    InvalidAdjustment(String),

    #[error("Invalid POSIX TZ string '{input}': {message}")]
    Posix { input: String, message: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Catalog parse error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DstError>;
