// Unit tests for domain models

use super::*;
use chrono::TimeZone;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap()
}

fn clip(day: i64, path: &str) -> ClipDescriptor {
    ClipDescriptor::new(DayIndex::new(day).unwrap(), at(5), path, 1.5).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

#[test]
fn test_day_index_range() {
    assert!(DayIndex::new(0).is_ok());
    assert!(DayIndex::new(6).is_ok());
    assert_eq!(
        DayIndex::new(7),
        Err(ValidationError::DayIndexOutOfRange(7))
    );
    assert!(DayIndex::new(-1).is_err());
    assert_eq!(DayIndex::all().count(), 7);
    assert_eq!(DayIndex::new(6).unwrap().short_name(), "Sun");
}

#[test]
fn test_week_id_parse() {
    assert_eq!(WeekId::parse("2025-W51").unwrap().as_str(), "2025-W51");
    assert!(WeekId::parse("2025-51").is_err());
    assert!(WeekId::parse("2025-W5").is_err());
    assert!(WeekId::parse("2025-W54").is_err());
    assert!(WeekId::parse("2025-W00").is_err());
    assert!(WeekId::parse("abcd-W10").is_err());
}

#[test]
fn test_clip_descriptor_validation() {
    let day = DayIndex::new(2).unwrap();
    assert!(ClipDescriptor::new(day, at(7), "clip.mp4", 0.0).is_err());
    assert!(ClipDescriptor::new(day, at(7), "clip.mp4", -1.0).is_err());
    assert!(ClipDescriptor::new(day, at(7), "clip.mp4", f64::NAN).is_err());
    assert_eq!(
        ClipDescriptor::new(day, at(7), "", 1.0),
        Err(ValidationError::EmptySourcePath)
    );
}

#[test]
fn test_insert_clip_replaces_same_day() {
    let policy = EligibilityPolicy::new(7).unwrap();
    let mut week = WeekRecord::empty_for(monday());

    assert!(week.insert_clip(clip(3, "a.mp4"), &policy).is_none());
    let replaced = week.insert_clip(clip(3, "b.mp4"), &policy);

    assert_eq!(replaced.unwrap().source_path(), Path::new("a.mp4"));
    assert_eq!(week.clip_count(), 1);
    assert_eq!(
        week.clip(DayIndex::new(3).unwrap()).unwrap().source_path(),
        Path::new("b.mp4")
    );
}

#[test]
fn test_status_follows_policy() {
    let at_least_one = EligibilityPolicy::new(1).unwrap();
    let all_seven = EligibilityPolicy::new(7).unwrap();

    let mut week = WeekRecord::empty_for(monday());
    week.insert_clip(clip(0, "a.mp4"), &at_least_one);
    assert_eq!(week.status(), &WeekStatus::Eligible);

    week.refresh_status(&all_seven);
    assert_eq!(week.status(), &WeekStatus::Incomplete);
}

#[test]
fn test_generated_output_survives_refresh() {
    let policy = EligibilityPolicy::new(1).unwrap();
    let mut week = WeekRecord::empty_for(monday());
    week.insert_clip(clip(0, "a.mp4"), &policy);
    week.set_generated_output("out/2026-W02.mp4");

    week.insert_clip(clip(1, "b.mp4"), &policy);
    assert_eq!(
        week.generated_output_path(),
        Some(Path::new("out/2026-W02.mp4"))
    );

    week.clear_generated_output(&policy);
    assert_eq!(week.status(), &WeekStatus::Eligible);
    assert!(week.generated_output_path().is_none());
}

#[test]
fn test_generated_week_eligibility_follows_clips() {
    let all_seven = EligibilityPolicy::new(7).unwrap();
    let at_least_one = EligibilityPolicy::new(1).unwrap();

    let mut week = WeekRecord::empty_for(monday());
    week.insert_clip(clip(0, "a.mp4"), &all_seven);
    week.set_generated_output("out/2026-W02.mp4");
    assert!(!week.is_eligible_for_stitch());

    week.refresh_status(&at_least_one);
    assert!(week.is_eligible_for_stitch());
    assert_eq!(
        week.status(),
        &WeekStatus::Generated {
            output_path: "out/2026-W02.mp4".into(),
            eligible: true
        }
    );

    week.refresh_status(&all_seven);
    assert!(!week.is_eligible_for_stitch());
    assert!(week.generated_output_path().is_some());
}

#[test]
fn test_week_record_json_shape() {
    let policy = EligibilityPolicy::new(1).unwrap();
    let mut week = WeekRecord::empty_for(NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
    week.insert_clip(clip(4, "thu.mp4"), &policy);

    let value = serde_json::to_value(&week).unwrap();
    assert_eq!(value["weekId"], "2026-W02");
    assert_eq!(value["startDate"], "2026-01-05");
    assert_eq!(value["isEligibleForStitch"], true);
    assert_eq!(value["clips"][0]["dayIndex"], 4);
    assert_eq!(value["clips"][0]["durationSeconds"], 1.5);
    assert!(value.get("generatedOutputPath").is_none());

    let back: WeekRecord = serde_json::from_value(value).unwrap();
    assert_eq!(back, week);
}

#[test]
fn test_week_record_ignores_unknown_keys() {
    let json = r#"{
        "weekId": "2026-W02",
        "startDate": "2026-01-07",
        "clips": [],
        "futureField": {"nested": true}
    }"#;
    let week: WeekRecord = serde_json::from_str(json).unwrap();
    assert_eq!(week.start_date(), monday());
    assert_eq!(week.status(), &WeekStatus::Incomplete);
}

#[test]
fn test_week_record_rejects_mismatched_week_id() {
    let json = r#"{"weekId": "2026-W09", "startDate": "2026-01-05"}"#;
    assert!(serde_json::from_str::<WeekRecord>(json).is_err());
}

#[test]
fn test_week_record_rejects_duplicate_days() {
    let json = r#"{
        "weekId": "2026-W02",
        "startDate": "2026-01-05",
        "clips": [
            {"dayIndex": 1, "capturedAt": "2026-01-06T08:00:00Z", "sourcePath": "a.mp4", "durationSeconds": 1.5},
            {"dayIndex": 1, "capturedAt": "2026-01-06T09:00:00Z", "sourcePath": "b.mp4", "durationSeconds": 1.5}
        ]
    }"#;
    assert!(serde_json::from_str::<WeekRecord>(json).is_err());
}

#[test]
fn test_clip_rejects_out_of_range_day_on_load() {
    let json = r#"{"dayIndex": 9, "capturedAt": "2026-01-06T08:00:00Z", "sourcePath": "a.mp4", "durationSeconds": 1.5}"#;
    assert!(serde_json::from_str::<ClipDescriptor>(json).is_err());
}
