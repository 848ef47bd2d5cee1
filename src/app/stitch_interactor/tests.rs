// Unit tests for the stitch interactor

use super::*;
use crate::adapters::{FixedClock, InMemorySnapshotStore};
use crate::domain::errors::{ExecutionError, FatalReason, PlanError};
use crate::domain::model::{ClipDescriptor, DayIndex, WeekStatus};
use crate::domain::rules::EligibilityPolicy;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Mutex as StdMutex;

enum Behavior {
    Succeed,
    Fail(ExecutionError),
    WaitForCancel,
}

struct FakeExecutor {
    behavior: Behavior,
    seen_audio: StdMutex<Vec<Option<PathBuf>>>,
}

impl FakeExecutor {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            seen_audio: StdMutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl StitchExecutor for FakeExecutor {
    async fn execute(
        &self,
        plan: &StitchPlan,
        mut context: ExecutionContext,
    ) -> Result<PathBuf, ExecutionError> {
        self.seen_audio
            .lock()
            .unwrap()
            .push(plan.audio().map(|a| a.source_path.clone()));
        context.progress().report(0.5);

        match &self.behavior {
            Behavior::Succeed => {
                context.progress().complete();
                Ok(plan.output_path().to_path_buf())
            }
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::WaitForCancel => {
                context.cancelled().await;
                Err(ExecutionError::Cancelled)
            }
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

async fn store_with_clips(threshold: usize, days: &[i64]) -> Arc<ClipStore> {
    let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 1, 7).unwrap()));
    let store = ClipStore::initialize(
        Arc::new(InMemorySnapshotStore::new()),
        clock,
        EligibilityPolicy::new(threshold).unwrap(),
        10,
    )
    .await;
    for &day in days {
        let clip = ClipDescriptor::new(
            DayIndex::new(day).unwrap(),
            Utc::now(),
            format!("/clips/{}.mp4", day),
            1.5,
        )
        .unwrap();
        store.add_clip(clip).await;
    }
    Arc::new(store)
}

fn interactor(store: Arc<ClipStore>, executor: Arc<FakeExecutor>) -> StitchInteractor {
    StitchInteractor::new(store, StitchPlanner::default(), executor, "/films")
}

fn current_week() -> WeekId {
    WeekId::parse("2026-W02").unwrap()
}

#[tokio::test]
async fn test_output_path_per_week() {
    let store = store_with_clips(1, &[]).await;
    let stitcher = interactor(store, FakeExecutor::new(Behavior::Succeed));

    assert_eq!(
        stitcher.output_path_for(&current_week()),
        PathBuf::from("/films/2026-W02.mp4")
    );
}

#[tokio::test]
async fn test_plan_for_current_week() {
    let store = store_with_clips(7, &[2, 0, 1]).await;
    let stitcher = interactor(store, FakeExecutor::new(Behavior::Succeed));

    let plan = stitcher.plan(None, None).await.unwrap();
    assert_eq!(plan.week_id(), &current_week());
    assert_eq!(plan.output_duration_seconds(), 9.0);
    assert_eq!(plan.output_path(), Path::new("/films/2026-W02.mp4"));
}

#[tokio::test]
async fn test_plan_for_empty_week() {
    let store = store_with_clips(1, &[]).await;
    let stitcher = interactor(store, FakeExecutor::new(Behavior::Succeed));

    let result = stitcher.plan(None, None).await;
    assert!(matches!(result, Err(StitchError::Plan(PlanError::Empty))));
}

#[tokio::test]
async fn test_unknown_week() {
    let store = store_with_clips(1, &[0]).await;
    let stitcher = interactor(store, FakeExecutor::new(Behavior::Succeed));

    let missing = WeekId::parse("2020-W10").unwrap();
    let result = stitcher.start(Some(&missing), None).await;
    assert!(matches!(result, Err(StitchError::NoSuchWeek(id)) if id == missing));
}

#[tokio::test]
async fn test_ineligible_week_is_refused() {
    let store = store_with_clips(7, &[0, 1, 2]).await;
    let stitcher = interactor(store, FakeExecutor::new(Behavior::Succeed));

    let result = stitcher.start(None, None).await;
    assert!(matches!(
        result,
        Err(StitchError::NotEligible {
            clips: 3,
            threshold: 7,
            ..
        })
    ));
}

#[tokio::test]
async fn test_success_records_output() {
    let store = store_with_clips(1, &[0, 2]).await;
    let stitcher = interactor(Arc::clone(&store), FakeExecutor::new(Behavior::Succeed));

    let handle = stitcher.start(None, None).await.unwrap();
    let progress = handle.progress();
    let path = handle.wait().await.unwrap();

    assert_eq!(path, PathBuf::from("/films/2026-W02.mp4"));
    assert_eq!(*progress.borrow(), 1.0);
    assert_eq!(
        store.current_week().await.status(),
        &WeekStatus::Generated {
            output_path: path,
            eligible: true
        }
    );
    assert!(stitcher.running().is_empty());
}

#[tokio::test]
async fn test_generated_week_below_threshold_is_refused() {
    let store = store_with_clips(7, &[0]).await;
    store
        .set_generated_output(&current_week(), "/films/imported.mp4")
        .await
        .unwrap();
    let stitcher = interactor(store, FakeExecutor::new(Behavior::Succeed));

    let result = stitcher.start(None, None).await;
    assert!(matches!(
        result,
        Err(StitchError::NotEligible {
            clips: 1,
            threshold: 7,
            ..
        })
    ));
}

#[tokio::test]
async fn test_fatal_failure_leaves_store_untouched() {
    let store = store_with_clips(1, &[0]).await;
    let executor = FakeExecutor::new(Behavior::Fail(ExecutionError::fatal(
        FatalReason::NoSpace,
        "disk full",
    )));
    let stitcher = interactor(Arc::clone(&store), executor);

    let err = stitcher
        .start(None, None)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap_err();

    assert!(!err.is_retryable());
    assert!(matches!(
        err,
        StitchError::Execution(ExecutionError::Fatal {
            reason: FatalReason::NoSpace,
            ..
        })
    ));
    assert_eq!(store.current_week().await.status(), &WeekStatus::Eligible);
}

#[tokio::test]
async fn test_transient_failure_is_retryable() {
    let store = store_with_clips(1, &[0]).await;
    let executor = FakeExecutor::new(Behavior::Fail(ExecutionError::transient("busy")));
    let stitcher = interactor(store, executor);

    let err = stitcher
        .start(None, None)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_single_flight_per_week() {
    let store = store_with_clips(1, &[0]).await;
    let stitcher = interactor(Arc::clone(&store), FakeExecutor::new(Behavior::WaitForCancel));

    let first = stitcher.start(None, None).await.unwrap();
    assert_eq!(stitcher.running(), vec![current_week()]);

    let second = stitcher.start(None, None).await;
    assert!(matches!(second, Err(StitchError::AlreadyRunning(id)) if id == current_week()));

    first.cancel();
    let result = first.wait().await;
    assert!(matches!(
        result,
        Err(StitchError::Execution(ExecutionError::Cancelled))
    ));
    assert_eq!(store.current_week().await.status(), &WeekStatus::Eligible);

    // The slot is free again
    let third = stitcher.start(None, None).await.unwrap();
    third.cancel();
    let _ = third.wait().await;
}

#[tokio::test]
async fn test_default_audio_track_and_override() {
    let store = store_with_clips(1, &[0]).await;
    let executor = FakeExecutor::new(Behavior::Succeed);
    let stitcher = interactor(store, Arc::clone(&executor))
        .with_audio_track(Some(PathBuf::from("/audio/zen.mp3")));

    stitcher.start(None, None).await.unwrap().wait().await.unwrap();
    stitcher
        .start(None, Some(Path::new("/audio/other.mp3")))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let seen = executor.seen_audio.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            Some(PathBuf::from("/audio/zen.mp3")),
            Some(PathBuf::from("/audio/other.mp3")),
        ]
    );
}
