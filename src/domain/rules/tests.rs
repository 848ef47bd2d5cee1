// Unit tests for business rules

use super::*;
use crate::domain::model::{ClipDescriptor, DayIndex};
use chrono::{TimeZone, Utc};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_threshold_bounds() {
    assert!(EligibilityPolicy::new(0).is_err());
    assert!(EligibilityPolicy::new(8).is_err());
    assert_eq!(EligibilityPolicy::new(1).unwrap().threshold(), 1);
    assert_eq!(EligibilityPolicy::full_week().threshold(), 7);
}

#[test]
fn test_is_eligible_and_remaining() {
    let policy = EligibilityPolicy::new(7).unwrap();
    assert!(!policy.is_eligible(6));
    assert!(policy.is_eligible(7));
    assert_eq!(policy.remaining(4), 3);
    assert_eq!(policy.remaining(7), 0);

    let lenient = EligibilityPolicy::new(1).unwrap();
    assert!(!lenient.is_eligible(0));
    assert!(lenient.is_eligible(1));
}

#[test]
fn test_rotation_due_only_across_week_boundary() {
    let week = WeekRecord::empty_for(date(2026, 1, 5));
    assert!(!RotationRule::is_due(&week, date(2026, 1, 11)));
    assert!(RotationRule::is_due(&week, date(2026, 1, 12)));
    assert!(RotationRule::is_due(&week, date(2025, 12, 31)));
}

#[test]
fn test_should_archive_requires_clips() {
    let policy = EligibilityPolicy::new(1).unwrap();
    let mut week = WeekRecord::empty_for(date(2026, 1, 5));
    assert!(!RotationRule::should_archive(&week));

    let clip = ClipDescriptor::new(
        DayIndex::new(0).unwrap(),
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
        "mon.mp4",
        1.5,
    )
    .unwrap();
    week.insert_clip(clip, &policy);
    assert!(RotationRule::should_archive(&week));
}
