// Ports - Interface definitions (contracts)

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::errors::{ExecutionError, PersistenceError};
use crate::engine::ExecutionContext;
use crate::planner::StitchPlan;

/// Port for the current date and time
pub trait Clock: Send + Sync {
    /// The user's local calendar date
    fn today(&self) -> NaiveDate;

    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Port for persisting the encoded store snapshot
#[async_trait]
pub trait SnapshotPort: Send + Sync {
    /// Load the last saved snapshot, `None` if nothing was ever saved
    async fn load(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the saved snapshot
    async fn save(&self, contents: &str) -> Result<(), PersistenceError>;
}

/// Port for rendering a stitch plan into a film
#[async_trait]
pub trait StitchExecutor: Send + Sync {
    /// Render `plan` to its output path.
    ///
    /// Progress goes through the context's reporter; when the context is
    /// cancelled the run stops and nothing is left at the output path.
    async fn execute(
        &self,
        plan: &StitchPlan,
        context: ExecutionContext,
    ) -> Result<PathBuf, ExecutionError>;

    /// Whether the media backend can be found
    async fn is_available(&self) -> bool;
}
