// Stitch interactor - Orchestrates planning and rendering of a weekly film

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::app::clip_store::ClipStore;
use crate::domain::model::{WeekId, WeekRecord};
use crate::engine::{ExecutionContext, ProgressReporter, StitchHandle};
use crate::error::StitchError;
use crate::planner::{StitchPlan, StitchPlanner};
use crate::ports::StitchExecutor;

/// Interactor for the stitch use case
pub struct StitchInteractor {
    store: Arc<ClipStore>,
    planner: StitchPlanner,
    executor: Arc<dyn StitchExecutor>,
    output_dir: PathBuf,
    audio_track: Option<PathBuf>,
    in_flight: Arc<Mutex<HashSet<WeekId>>>,
}

impl StitchInteractor {
    pub fn new(
        store: Arc<ClipStore>,
        planner: StitchPlanner,
        executor: Arc<dyn StitchExecutor>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            planner,
            executor,
            output_dir: output_dir.into(),
            audio_track: None,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Default background track for every stitch
    pub fn with_audio_track(mut self, track: Option<PathBuf>) -> Self {
        self.audio_track = track;
        self
    }

    /// Destination of the film for `week_id`
    pub fn output_path_for(&self, week_id: &WeekId) -> PathBuf {
        self.output_dir.join(format!("{}.mp4", week_id))
    }

    pub async fn is_backend_available(&self) -> bool {
        self.executor.is_available().await
    }

    /// Build the plan for a week (the current one when `week_id` is
    /// `None`) without running it
    pub async fn plan(
        &self,
        week_id: Option<&WeekId>,
        audio_track: Option<&Path>,
    ) -> Result<StitchPlan, StitchError> {
        let week = self.resolve_week(week_id).await?;
        self.plan_for(&week, audio_track)
    }

    /// Start rendering a week's film on a background task.
    ///
    /// The week must be eligible and not already rendering. On success the
    /// output path is recorded in the store; failures leave it untouched.
    pub async fn start(
        &self,
        week_id: Option<&WeekId>,
        audio_track: Option<&Path>,
    ) -> Result<StitchHandle, StitchError> {
        let week = self.resolve_week(week_id).await?;
        if !week.is_eligible_for_stitch() {
            return Err(StitchError::NotEligible {
                week_id: week.week_id().clone(),
                clips: week.clip_count(),
                threshold: self.store.policy().threshold(),
            });
        }

        let plan = self.plan_for(&week, audio_track)?;
        let guard = InFlightGuard::claim(&self.in_flight, week.week_id())
            .ok_or_else(|| StitchError::AlreadyRunning(week.week_id().clone()))?;

        let (progress, progress_rx) = ProgressReporter::channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let context = ExecutionContext::new(progress, cancel_rx);

        let store = Arc::clone(&self.store);
        let executor = Arc::clone(&self.executor);
        let task_week = week.week_id().clone();

        info!(week = %task_week, output = %plan.output_path().display(), "Stitch started");
        let task = tokio::spawn(async move {
            let _guard = guard;
            let result = executor.execute(&plan, context).await;
            match result {
                Ok(path) => {
                    if let Err(e) = store.set_generated_output(&task_week, &path).await {
                        warn!("Film rendered but not recorded: {}", e);
                    }
                    info!(week = %task_week, "Stitch finished");
                    Ok(path)
                }
                Err(e) => {
                    warn!(week = %task_week, "Stitch failed: {}", e);
                    Err(StitchError::Execution(e))
                }
            }
        });

        Ok(StitchHandle::new(
            week.week_id().clone(),
            progress_rx,
            cancel_tx,
            task,
        ))
    }

    /// Weeks currently rendering
    pub fn running(&self) -> Vec<WeekId> {
        match self.in_flight.lock() {
            Ok(set) => set.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    async fn resolve_week(&self, week_id: Option<&WeekId>) -> Result<WeekRecord, StitchError> {
        match week_id {
            None => Ok(self.store.current_week().await),
            Some(id) => self
                .store
                .week(id)
                .await
                .ok_or_else(|| StitchError::NoSuchWeek(id.clone())),
        }
    }

    fn plan_for(
        &self,
        week: &WeekRecord,
        audio_track: Option<&Path>,
    ) -> Result<StitchPlan, StitchError> {
        let audio = audio_track.or(self.audio_track.as_deref());
        let plan = self.planner.build_plan(
            week.week_id(),
            &week.ordered_clips(),
            audio,
            self.output_path_for(week.week_id()),
        )?;
        Ok(plan)
    }
}

/// Marks a week as rendering until dropped
struct InFlightGuard {
    set: Arc<Mutex<HashSet<WeekId>>>,
    week_id: WeekId,
}

impl InFlightGuard {
    fn claim(set: &Arc<Mutex<HashSet<WeekId>>>, week_id: &WeekId) -> Option<Self> {
        let mut running = set.lock().ok()?;
        if !running.insert(week_id.clone()) {
            return None;
        }
        Some(Self {
            set: Arc::clone(set),
            week_id: week_id.clone(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut running) = self.set.lock() {
            running.remove(&self.week_id);
        }
    }
}

#[cfg(test)]
mod tests;
