//! End-to-end tests: the clip store over a real snapshot file, container
//! wiring, and the command-line interface

use std::fs;
use std::path::Path;
use std::sync::Arc;

use assert_cmd::Command;
use chrono::{NaiveDate, Utc};
use predicates::prelude::*;
use tempfile::TempDir;
use weekreel::adapters::{AppConfig, FixedClock, InMemorySnapshotStore, JsonFileSnapshotStore};
use weekreel::app::{AppContainer, ClipStore, DefaultAppContainer};
use weekreel::domain::rules::EligibilityPolicy;
use weekreel::{ClipDescriptor, DayIndex, WeekId, WeekStatus};

/// Test utilities
mod test_utils {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn clip(day: i64) -> ClipDescriptor {
        ClipDescriptor::new(
            DayIndex::new(day).unwrap(),
            Utc::now(),
            format!("/clips/{}.mp4", day),
            1.5,
        )
        .unwrap()
    }

    pub async fn open_store(dir: &Path, clock: Arc<FixedClock>, threshold: usize) -> ClipStore {
        ClipStore::initialize(
            Arc::new(JsonFileSnapshotStore::in_dir(dir)),
            clock,
            EligibilityPolicy::new(threshold).unwrap(),
            10,
        )
        .await
    }

    /// CLI invocation isolated to `dir`
    pub fn weekreel(dir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("weekreel").unwrap();
        cmd.current_dir(dir)
            .env_remove("WEEKREEL_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(dir.join("data"))
            .arg("--log-level")
            .arg("error");
        cmd
    }
}

use test_utils::*;

#[tokio::test]
async fn test_week_survives_restart_and_rotates() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(date(2026, 1, 7)));

    {
        let store = open_store(dir.path(), Arc::clone(&clock), 2).await;
        store.add_clip(clip(0)).await;
        store.add_clip(clip(2)).await;
        store.complete_onboarding().await;
    }
    assert!(dir.path().join("state.json").is_file());

    // Same week: everything is restored
    let store = open_store(dir.path(), Arc::clone(&clock), 2).await;
    let week = store.current_week().await;
    assert_eq!(week.week_id().as_str(), "2026-W02");
    assert_eq!(week.clip_count(), 2);
    assert_eq!(week.status(), &WeekStatus::Eligible);
    assert!(store.onboarding_done().await);
    drop(store);

    // Next week: the old week moves to history on load
    clock.set(date(2026, 1, 13));
    let store = open_store(dir.path(), Arc::clone(&clock), 2).await;
    assert_eq!(store.current_week().await.week_id().as_str(), "2026-W03");
    assert!(!store.current_week().await.has_clips());

    let history = store.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].week_id().as_str(), "2026-W02");
    assert_eq!(history[0].clip_count(), 2);

    // A film rendered later for the archived week is recorded in place
    let w02 = WeekId::parse("2026-W02").unwrap();
    store
        .set_generated_output(&w02, "/films/2026-W02.mp4")
        .await
        .unwrap();
    drop(store);

    let store = open_store(dir.path(), clock, 2).await;
    let archived = store.week(&w02).await.unwrap();
    assert_eq!(
        archived.generated_output_path(),
        Some(Path::new("/films/2026-W02.mp4"))
    );
}

#[tokio::test]
async fn test_corrupt_state_file_starts_fresh() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("state.json"), "{ not json").unwrap();

    let clock = Arc::new(FixedClock::new(date(2026, 1, 7)));
    let store = open_store(dir.path(), clock, 7).await;

    assert!(!store.current_week().await.has_clips());
    assert!(store.history().await.is_empty());
    assert!(!store.onboarding_done().await);
}

#[tokio::test]
async fn test_container_wires_store_and_stitcher() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.store.eligibility_threshold = 1;
    config.paths.output_dir = dir.path().join("films");

    let container = DefaultAppContainer::with_ports(
        &config,
        config.eligibility_policy().unwrap(),
        Arc::new(InMemorySnapshotStore::new()),
        Arc::new(FixedClock::new(date(2026, 1, 7))),
    )
    .await
    .unwrap();

    container.clip_store().add_clip(clip(1)).await;
    let plan = container.stitch_interactor().plan(None, None).await.unwrap();

    assert_eq!(plan.output_duration_seconds(), 3.0);
    assert_eq!(plan.output_path(), dir.path().join("films/2026-W02.mp4"));
}

#[test]
fn test_cli_status_on_fresh_data_dir() {
    let dir = TempDir::new().unwrap();

    weekreel(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0/7 clips"))
        .stdout(predicate::str::contains("incomplete"));
}

#[test]
fn test_cli_add_clip_then_status_json() {
    let dir = TempDir::new().unwrap();
    let clip_file = dir.path().join("monday.mp4");
    fs::write(&clip_file, b"fake video data").unwrap();

    weekreel(dir.path())
        .args(["add-clip", "--day", "0", "--file"])
        .arg(&clip_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mon: clip added"));

    weekreel(dir.path())
        .args(["add-clip", "--day", "0", "--duration", "2.0", "--file"])
        .arg(&clip_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mon: clip replaced"));

    assert!(dir.path().join("data/state.json").is_file());

    weekreel(dir.path())
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"clips\": 1"))
        .stdout(predicate::str::contains("\"threshold\": 7"));
}

#[test]
fn test_cli_add_clip_rejects_missing_file() {
    let dir = TempDir::new().unwrap();

    weekreel(dir.path())
        .args(["add-clip", "--file", "nowhere.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_rejects_bad_day_and_week() {
    let dir = TempDir::new().unwrap();

    weekreel(dir.path())
        .args(["add-clip", "--file", "x.mp4", "--day", "7"])
        .assert()
        .failure();

    weekreel(dir.path())
        .args(["plan", "--week", "2026-02"])
        .assert()
        .failure();
}

#[test]
fn test_cli_onboard_once() {
    let dir = TempDir::new().unwrap();

    weekreel(dir.path())
        .arg("onboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Onboarding complete"));

    weekreel(dir.path())
        .arg("onboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("already complete"));
}

#[test]
fn test_cli_history_starts_empty() {
    let dir = TempDir::new().unwrap();

    weekreel(dir.path())
        .args(["history", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_cli_plan_and_stitch_need_clips() {
    let dir = TempDir::new().unwrap();

    weekreel(dir.path())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no clips"));

    weekreel(dir.path())
        .arg("stitch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not eligible"));
}

#[test]
fn test_cli_plan_with_config_threshold() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("weekreel.toml"),
        "[store]\neligibility_threshold = 1\n",
    )
    .unwrap();
    let clip_file = dir.path().join("clip.mp4");
    fs::write(&clip_file, b"fake video data").unwrap();

    weekreel(dir.path())
        .args(["add-clip", "--file"])
        .arg(&clip_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("(eligible)"));

    weekreel(dir.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"output_duration_seconds\": 3.0"));
}

#[test]
fn test_cli_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("weekreel.toml"),
        "[store]\neligibility_threshold = 9\n",
    )
    .unwrap();

    weekreel(dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("eligibility_threshold"));
}
