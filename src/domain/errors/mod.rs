// Domain errors - Error taxonomy for the week store, planner and executor

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::{DayIndex, WeekId};

/// Validation failures when constructing domain values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("day index {0} is outside 0..=6")]
    DayIndexOutOfRange(i64),

    #[error("clip duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),

    #[error("clip source path is empty")]
    EmptySourcePath,

    #[error("malformed week id '{0}', expected YYYY-Www")]
    MalformedWeekId(String),

    #[error("eligibility threshold must be within 1..=7, got {0}")]
    ThresholdOutOfRange(usize),

    #[error("week {week_id} does not start on {start_date}")]
    WeekIdMismatch { week_id: String, start_date: String },

    #[error("day {0} appears more than once in a week record")]
    DuplicateDay(DayIndex),
}

/// A persisted snapshot section that could not be decoded.
///
/// Always recovered locally: the section is discarded and replaced by
/// its default, and the incident is logged.
#[derive(Debug, Clone, Error)]
#[error("discarded corrupt '{section}' section: {reason}")]
pub struct DataCorruption {
    pub section: &'static str,
    pub reason: String,
}

impl DataCorruption {
    pub fn new(section: &'static str, reason: impl Into<String>) -> Self {
        Self {
            section,
            reason: reason.into(),
        }
    }
}

/// Errors from building a stitch plan
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// No clips to stitch ("nothing to generate")
    #[error("nothing to generate: no clips were supplied")]
    Empty,

    #[error("speed factor must be a positive finite number, got {0}")]
    InvalidSpeedFactor(f64),

    #[error("more than one clip supplied for day {0}")]
    DuplicateDay(DayIndex),
}

/// Why an execution failed terminally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalReason {
    /// The media backend binary could not be located
    BackendUnavailable,
    /// A clip or audio input does not exist
    MissingInput,
    /// The backend could not decode an input
    CorruptInput,
    /// The destination ran out of space
    NoSpace,
    /// The destination could not be written
    OutputUnwritable,
    /// Unclassified backend failure
    Backend,
}

impl std::fmt::Display for FatalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FatalReason::BackendUnavailable => "media backend unavailable",
            FatalReason::MissingInput => "missing input",
            FatalReason::CorruptInput => "corrupt input",
            FatalReason::NoSpace => "no space left on device",
            FatalReason::OutputUnwritable => "output not writable",
            FatalReason::Backend => "backend failure",
        };
        f.write_str(text)
    }
}

/// Errors reported by a stitch executor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// Retryable by re-running plan + execute; never retried by the core
    #[error("transient execution failure: {detail}")]
    Transient { detail: String },

    /// Terminal failure for this attempt
    #[error("execution failed ({reason}): {detail}")]
    Fatal { reason: FatalReason, detail: String },

    /// The caller cancelled the run
    #[error("execution cancelled")]
    Cancelled,
}

impl ExecutionError {
    pub fn transient(detail: impl Into<String>) -> Self {
        Self::Transient {
            detail: detail.into(),
        }
    }

    pub fn fatal(reason: FatalReason, detail: impl Into<String>) -> Self {
        Self::Fatal {
            reason,
            detail: detail.into(),
        }
    }

    /// Whether the caller may reasonably retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecutionError::Transient { .. })
    }
}

/// Errors from week-state operations that indicate a caller bug
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("no such week: {0}")]
    NoSuchWeek(WeekId),
}

/// Errors from a persistence backend
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}
