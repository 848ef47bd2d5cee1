//! weekreel library
//!
//! Core of a daily video journal: an ISO-week calendar, a persistent store
//! that rotates finished weeks into a bounded history, and a planner plus
//! ffmpeg executor that turn a week's clips into one film.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{ClipDescriptor, DayIndex, WeekId, WeekRecord, WeekStatus};
pub use error::{AppError, AppResult, StitchError};
