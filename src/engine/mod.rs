//! Stitch execution runtime: progress, cancellation and task handles

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::model::WeekId;
use crate::error::StitchError;

pub mod progress;

pub use progress::ProgressReporter;

/// Per-run context handed to a [`StitchExecutor`](crate::ports::StitchExecutor)
#[derive(Debug)]
pub struct ExecutionContext {
    progress: ProgressReporter,
    cancel: watch::Receiver<bool>,
}

impl ExecutionContext {
    pub fn new(progress: ProgressReporter, cancel: watch::Receiver<bool>) -> Self {
        Self { progress, cancel }
    }

    /// Context that is never cancelled and whose progress goes nowhere
    pub fn detached() -> Self {
        let (_, cancel) = watch::channel(false);
        Self::new(ProgressReporter::detached(), cancel)
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the
    /// cancel sender is dropped without firing.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.cancel.borrow_and_update() {
                return;
            }
            if self.cancel.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Cloneable trigger that cancels one stitch run
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Handle to a stitch running on a background task
#[derive(Debug)]
pub struct StitchHandle {
    week_id: WeekId,
    progress: watch::Receiver<f64>,
    cancel: CancelSignal,
    task: JoinHandle<Result<PathBuf, StitchError>>,
}

impl StitchHandle {
    pub fn new(
        week_id: WeekId,
        progress: watch::Receiver<f64>,
        cancel: watch::Sender<bool>,
        task: JoinHandle<Result<PathBuf, StitchError>>,
    ) -> Self {
        Self {
            week_id,
            progress,
            cancel: CancelSignal {
                tx: Arc::new(cancel),
            },
            task,
        }
    }

    pub fn week_id(&self) -> &WeekId {
        &self.week_id
    }

    /// Receiver for progress updates in `[0.0, 1.0]`
    pub fn progress(&self) -> watch::Receiver<f64> {
        self.progress.clone()
    }

    pub fn current_progress(&self) -> f64 {
        *self.progress.borrow()
    }

    /// Request cancellation; the run resolves with `Cancelled`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Signal that can cancel this run from elsewhere
    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Wait for the run to finish
    pub async fn wait(self) -> Result<PathBuf, StitchError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(StitchError::Aborted(e.to_string())),
        }
    }
}
