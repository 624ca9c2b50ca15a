use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading, generating or writing appointment tables.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("the input file '{}' was not found. Run `schedule-check generate` first", .0.display())]
    InputNotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}: {reason}")]
    InvalidRecord { row: u64, reason: String },

    #[error("unparseable timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
