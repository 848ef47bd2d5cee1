// Domain rules - Eligibility and rotation policies

use chrono::NaiveDate;

use crate::domain::calendar::WeekCalendar;
use crate::domain::errors::ValidationError;
use crate::domain::model::{WeekRecord, DAYS_PER_WEEK};

/// Minimum number of captured days before a week may be stitched.
///
/// There is deliberately no `Default`: whether one clip or a full week
/// unlocks generation is a product decision supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityPolicy {
    threshold: usize,
}

impl EligibilityPolicy {
    /// Create a policy requiring `threshold` clips (1..=7)
    pub fn new(threshold: usize) -> Result<Self, ValidationError> {
        if (1..=DAYS_PER_WEEK).contains(&threshold) {
            Ok(Self { threshold })
        } else {
            Err(ValidationError::ThresholdOutOfRange(threshold))
        }
    }

    /// Policy requiring every day of the week
    pub fn full_week() -> Self {
        Self {
            threshold: DAYS_PER_WEEK,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_eligible(&self, clip_count: usize) -> bool {
        clip_count >= self.threshold
    }

    /// Clips still missing before the week becomes eligible
    pub fn remaining(&self, clip_count: usize) -> usize {
        self.threshold.saturating_sub(clip_count)
    }
}

/// Business rules for week rotation
pub struct RotationRule;

impl RotationRule {
    /// Whether `current` belongs to a different ISO week than `today`
    pub fn is_due(current: &WeekRecord, today: NaiveDate) -> bool {
        WeekCalendar::week_id(today) != *current.week_id()
    }

    /// Whether a retiring week should be kept in history
    pub fn should_archive(retiring: &WeekRecord) -> bool {
        retiring.has_clips()
    }
}

#[cfg(test)]
mod tests;
