// Clip store - Week state machine over the current week and its history

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::archive::HistoryArchive;
use crate::domain::calendar::WeekCalendar;
use crate::domain::errors::StateError;
use crate::domain::model::{ClipDescriptor, DayIndex, WeekId, WeekRecord, WeekStatus};
use crate::domain::rules::{EligibilityPolicy, RotationRule};
use crate::domain::snapshot::Snapshot;
use crate::ports::{Clock, SnapshotPort};

/// Result of a rotation check
#[derive(Debug, Clone, PartialEq)]
pub enum RotationOutcome {
    /// The current week already matches today
    Unchanged,
    /// The current week was retired and replaced by an empty one
    Rotated {
        retired: WeekId,
        /// Whether the retired week had clips and went into history
        archived: bool,
        /// Oldest history entry pushed out by the archive
        evicted: Option<WeekId>,
        current: WeekId,
    },
}

impl RotationOutcome {
    pub fn rotated(&self) -> bool {
        matches!(self, RotationOutcome::Rotated { .. })
    }
}

/// Result of adding a clip
#[derive(Debug, Clone, PartialEq)]
pub struct AddedClip {
    pub week_id: WeekId,
    pub day_index: DayIndex,
    /// Whether an earlier clip for the same day was replaced
    pub replaced: bool,
    pub clip_count: usize,
    pub status: WeekStatus,
}

struct StoreState {
    current: WeekRecord,
    history: HistoryArchive,
    onboarding_done: bool,
}

impl StoreState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            current: Some(self.current.clone()),
            history: self.history.to_vec(),
            onboarding_done: self.onboarding_done,
        }
    }
}

/// Owns the current week, the history archive and the onboarding flag.
///
/// Every mutation runs under one async lock and saves the snapshot before
/// releasing it, so saves land in mutation order. A failed save is logged
/// and the in-memory state stays authoritative.
pub struct ClipStore {
    state: Mutex<StoreState>,
    snapshots: Arc<dyn SnapshotPort>,
    clock: Arc<dyn Clock>,
    policy: EligibilityPolicy,
}

impl ClipStore {
    /// Load the persisted snapshot and run the rotation check.
    ///
    /// Never fails: unreadable or corrupt data is logged and replaced by
    /// defaults.
    pub async fn initialize(
        snapshots: Arc<dyn SnapshotPort>,
        clock: Arc<dyn Clock>,
        policy: EligibilityPolicy,
        history_capacity: usize,
    ) -> Self {
        let today = clock.today();
        let mut dirty = false;

        let snapshot = match snapshots.load().await {
            Ok(Some(raw)) => {
                let decoded = Snapshot::decode(&raw);
                for corruption in &decoded.corruption {
                    warn!("{}", corruption);
                }
                dirty = !decoded.corruption.is_empty();
                decoded.snapshot
            }
            Ok(None) => {
                debug!("No saved snapshot, starting fresh");
                Snapshot::default()
            }
            Err(e) => {
                warn!("Failed to load snapshot, starting fresh: {}", e);
                Snapshot::default()
            }
        };

        let mut current = snapshot
            .current
            .unwrap_or_else(|| WeekRecord::empty_for(today));
        current.refresh_status(&policy);

        let mut past_weeks = snapshot.history;
        for week in &mut past_weeks {
            week.refresh_status(&policy);
        }
        let history = HistoryArchive::from_weeks(past_weeks, history_capacity);

        let store = Self {
            state: Mutex::new(StoreState {
                current,
                history,
                onboarding_done: snapshot.onboarding_done,
            }),
            snapshots,
            clock,
            policy,
        };

        {
            let mut state = store.state.lock().await;
            let outcome = store.rotate_locked(&mut state, false);
            if dirty || outcome.rotated() {
                store.persist(&state).await;
            }
            info!(
                week = %state.current.week_id(),
                clips = state.current.clip_count(),
                history = state.history.len(),
                "Clip store ready"
            );
        }

        store
    }

    pub fn policy(&self) -> EligibilityPolicy {
        self.policy
    }

    /// Record a clip for its day in the current week, replacing any
    /// earlier clip for that day
    pub async fn add_clip(&self, clip: ClipDescriptor) -> AddedClip {
        let mut state = self.state.lock().await;
        self.rotate_locked(&mut state, false);

        let day_index = clip.day_index();
        let replaced = state.current.insert_clip(clip, &self.policy).is_some();
        let added = AddedClip {
            week_id: state.current.week_id().clone(),
            day_index,
            replaced,
            clip_count: state.current.clip_count(),
            status: state.current.status().clone(),
        };

        info!(
            week = %added.week_id,
            day = %day_index,
            clips = added.clip_count,
            replaced,
            status = added.status.label(),
            "Clip recorded"
        );

        self.persist(&state).await;
        added
    }

    /// Retire the current week if today belongs to a different one
    pub async fn rotate_if_necessary(&self) -> RotationOutcome {
        let mut state = self.state.lock().await;
        let outcome = self.rotate_locked(&mut state, false);
        if outcome.rotated() {
            self.persist(&state).await;
        }
        outcome
    }

    /// Retire the current week unconditionally
    pub async fn force_rotate(&self) -> RotationOutcome {
        let mut state = self.state.lock().await;
        let outcome = self.rotate_locked(&mut state, true);
        self.persist(&state).await;
        outcome
    }

    /// Record the film generated for `week_id`, in the current week or
    /// in history
    pub async fn set_generated_output(
        &self,
        week_id: &WeekId,
        output_path: impl Into<PathBuf>,
    ) -> Result<(), StateError> {
        let output_path = output_path.into();
        let mut state = self.state.lock().await;
        self.rotate_locked(&mut state, false);

        let record = if state.current.week_id() == week_id {
            Some(&mut state.current)
        } else {
            state.history.get_mut(week_id)
        };

        match record {
            Some(record) => {
                record.set_generated_output(&output_path);
                info!(week = %week_id, output = %output_path.display(), "Generated film recorded");
            }
            None => {
                warn!(week = %week_id, "Cannot record generated film: no such week");
                return Err(StateError::NoSuchWeek(week_id.clone()));
            }
        }

        self.persist(&state).await;
        Ok(())
    }

    /// Forget the film recorded for the current week. Returns whether one
    /// was recorded.
    pub async fn clear_generated_output(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.current.generated_output_path().is_none() {
            return false;
        }
        state.current.clear_generated_output(&self.policy);
        debug!(week = %state.current.week_id(), "Generated film cleared");
        self.persist(&state).await;
        true
    }

    pub async fn complete_onboarding(&self) {
        let mut state = self.state.lock().await;
        if state.onboarding_done {
            return;
        }
        state.onboarding_done = true;
        self.persist(&state).await;
    }

    pub async fn onboarding_done(&self) -> bool {
        self.state.lock().await.onboarding_done
    }

    /// Clip recorded for `day` in the current week
    pub async fn clip_for(&self, day: DayIndex) -> Option<ClipDescriptor> {
        self.state.lock().await.current.clip(day).cloned()
    }

    /// Whether today's clip has been recorded
    pub async fn has_clip_today(&self) -> bool {
        let today = self.clock.today();
        let state = self.state.lock().await;
        *state.current.week_id() == WeekCalendar::week_id(today)
            && state.current.clip(WeekCalendar::day_index(today)).is_some()
    }

    pub async fn current_week(&self) -> WeekRecord {
        self.state.lock().await.current.clone()
    }

    /// Past weeks, newest first
    pub async fn history(&self) -> Vec<WeekRecord> {
        self.state.lock().await.history.to_vec()
    }

    /// The current week or a history entry with this id
    pub async fn week(&self, week_id: &WeekId) -> Option<WeekRecord> {
        let state = self.state.lock().await;
        if state.current.week_id() == week_id {
            Some(state.current.clone())
        } else {
            state.history.get(week_id).cloned()
        }
    }

    pub fn today_index(&self) -> DayIndex {
        WeekCalendar::day_index(self.clock.today())
    }

    pub fn is_today(&self, day: DayIndex) -> bool {
        self.today_index() == day
    }

    fn rotate_locked(&self, state: &mut StoreState, force: bool) -> RotationOutcome {
        let today = self.clock.today();
        if !force && !RotationRule::is_due(&state.current, today) {
            return RotationOutcome::Unchanged;
        }

        let retiring = std::mem::replace(&mut state.current, WeekRecord::empty_for(today));
        let retired = retiring.week_id().clone();
        let archived = RotationRule::should_archive(&retiring);
        let evicted = if archived {
            state
                .history
                .push(retiring)
                .map(|week| week.week_id().clone())
        } else {
            None
        };

        info!(
            retired = %retired,
            current = %state.current.week_id(),
            archived,
            evicted = ?evicted.as_ref().map(WeekId::as_str),
            "Week rotated"
        );

        RotationOutcome::Rotated {
            retired,
            archived,
            evicted,
            current: state.current.week_id().clone(),
        }
    }

    async fn persist(&self, state: &StoreState) {
        let encoded = match state.snapshot().encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = self.snapshots.save(&encoded).await {
            warn!("Failed to save snapshot: {}", e);
        }
    }
}
