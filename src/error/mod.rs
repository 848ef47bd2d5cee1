//! Error handling module for weekreel

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::errors::{ExecutionError, PersistenceError, PlanError, ValidationError};
use crate::domain::model::WeekId;

/// Errors from requesting or running a stitch
#[derive(Error, Debug)]
pub enum StitchError {
    /// The week is neither current nor in history
    #[error("no such week: {0}")]
    NoSuchWeek(WeekId),

    /// The week does not have enough clips yet
    #[error("week {week_id} is not eligible: {clips} of {threshold} clips captured")]
    NotEligible {
        week_id: WeekId,
        clips: usize,
        threshold: usize,
    },

    /// A stitch for this week is already running
    #[error("a stitch for week {0} is already running")]
    AlreadyRunning(WeekId),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The background task panicked or was aborted
    #[error("stitch task aborted: {0}")]
    Aborted(String),
}

impl StitchError {
    /// Whether re-running plan + execute might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StitchError::Execution(e) if e.is_retryable())
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Main error type for the weekreel binary
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    /// Logging could not be installed
    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for weekreel operations
pub type AppResult<T> = Result<T, AppError>;
