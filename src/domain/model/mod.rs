// Domain models - Clips, weeks and their persisted shapes

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::calendar::WeekCalendar;
use crate::domain::errors::ValidationError;
use crate::domain::rules::EligibilityPolicy;

/// Number of capture days in a week
pub const DAYS_PER_WEEK: usize = 7;

/// Day position within a week, 0 = Monday .. 6 = Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct DayIndex(u8);

impl DayIndex {
    /// Create a day index, rejecting values outside 0..=6
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (0..DAYS_PER_WEEK as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::DayIndexOutOfRange(value))
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        Self(weekday.num_days_from_monday() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// All seven days in order
    pub fn all() -> impl Iterator<Item = DayIndex> {
        (0..DAYS_PER_WEEK as u8).map(DayIndex)
    }

    /// Short English day name
    pub fn short_name(self) -> &'static str {
        ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"][self.0 as usize]
    }
}

impl TryFrom<i64> for DayIndex {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayIndex> for u8 {
    fn from(day: DayIndex) -> Self {
        day.0
    }
}

impl fmt::Display for DayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO week identifier in `YYYY-Www` form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekId(String);

impl WeekId {
    /// Build from an ISO week-numbering year and week number
    pub fn from_parts(year: i32, week: u32) -> Self {
        Self(format!("{:04}-W{:02}", year, week))
    }

    /// Parse and validate a `YYYY-Www` string
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let malformed = || ValidationError::MalformedWeekId(text.to_string());

        let (year, week) = text.trim().split_once("-W").ok_or_else(malformed)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let week: u32 = week.parse().map_err(|_| malformed())?;
        if !(1..=53).contains(&week) {
            return Err(malformed());
        }

        Ok(Self::from_parts(year, week))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WeekId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WeekId> for String {
    fn from(id: WeekId) -> Self {
        id.0
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recorded daily clip. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ClipDescriptorRepr")]
pub struct ClipDescriptor {
    day_index: DayIndex,
    captured_at: DateTime<Utc>,
    source_path: PathBuf,
    duration_seconds: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClipDescriptorRepr {
    day_index: DayIndex,
    captured_at: DateTime<Utc>,
    source_path: PathBuf,
    duration_seconds: f64,
}

impl TryFrom<ClipDescriptorRepr> for ClipDescriptor {
    type Error = ValidationError;

    fn try_from(repr: ClipDescriptorRepr) -> Result<Self, Self::Error> {
        Self::new(
            repr.day_index,
            repr.captured_at,
            repr.source_path,
            repr.duration_seconds,
        )
    }
}

impl ClipDescriptor {
    /// Create a clip descriptor with validation
    pub fn new(
        day_index: DayIndex,
        captured_at: DateTime<Utc>,
        source_path: impl Into<PathBuf>,
        duration_seconds: f64,
    ) -> Result<Self, ValidationError> {
        let source_path = source_path.into();
        if source_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptySourcePath);
        }
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(ValidationError::InvalidDuration(duration_seconds));
        }

        Ok(Self {
            day_index,
            captured_at,
            source_path,
            duration_seconds,
        })
    }

    pub fn day_index(&self) -> DayIndex {
        self.day_index
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }
}

/// Explicit stitch state of a week
#[derive(Debug, Clone, PartialEq)]
pub enum WeekStatus {
    /// Not enough clips to generate a film
    Incomplete,
    /// Enough clips; no film recorded yet
    Eligible,
    /// A film has been generated for this week. `eligible` still tracks
    /// the clip count against the threshold.
    Generated { output_path: PathBuf, eligible: bool },
}

impl WeekStatus {
    pub fn is_eligible(&self) -> bool {
        match self {
            WeekStatus::Incomplete => false,
            WeekStatus::Eligible => true,
            WeekStatus::Generated { eligible, .. } => *eligible,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeekStatus::Incomplete => "incomplete",
            WeekStatus::Eligible => "eligible",
            WeekStatus::Generated { .. } => "generated",
        }
    }
}

/// One week of captured clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeekRecordRepr", into = "WeekRecordRepr")]
pub struct WeekRecord {
    week_id: WeekId,
    start_date: NaiveDate,
    clips: BTreeMap<DayIndex, ClipDescriptor>,
    status: WeekStatus,
}

/// Persisted shape of a week. Extra keys are ignored and every field
/// past the identity has a default, so older snapshots keep loading.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeekRecordRepr {
    week_id: WeekId,
    start_date: NaiveDate,
    #[serde(default)]
    clips: Vec<ClipDescriptor>,
    #[serde(default)]
    is_eligible_for_stitch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated_output_path: Option<PathBuf>,
}

impl TryFrom<WeekRecordRepr> for WeekRecord {
    type Error = ValidationError;

    fn try_from(repr: WeekRecordRepr) -> Result<Self, Self::Error> {
        let expected = WeekCalendar::week_id(repr.start_date);
        if expected != repr.week_id {
            return Err(ValidationError::WeekIdMismatch {
                week_id: repr.week_id.to_string(),
                start_date: repr.start_date.to_string(),
            });
        }

        let mut clips = BTreeMap::new();
        for clip in repr.clips {
            let day = clip.day_index();
            if clips.insert(day, clip).is_some() {
                return Err(ValidationError::DuplicateDay(day));
            }
        }

        let status = match repr.generated_output_path {
            Some(output_path) => WeekStatus::Generated {
                output_path,
                eligible: repr.is_eligible_for_stitch,
            },
            None if repr.is_eligible_for_stitch => WeekStatus::Eligible,
            None => WeekStatus::Incomplete,
        };

        Ok(Self {
            week_id: repr.week_id,
            start_date: WeekCalendar::monday_of(repr.start_date),
            clips,
            status,
        })
    }
}

impl From<WeekRecord> for WeekRecordRepr {
    fn from(record: WeekRecord) -> Self {
        let is_eligible_for_stitch = record.status.is_eligible();
        let generated_output_path = match record.status {
            WeekStatus::Generated { output_path, .. } => Some(output_path),
            _ => None,
        };

        Self {
            week_id: record.week_id,
            start_date: record.start_date,
            clips: record.clips.into_values().collect(),
            is_eligible_for_stitch,
            generated_output_path,
        }
    }
}

impl WeekRecord {
    /// Empty record for the week containing `date`
    pub fn empty_for(date: NaiveDate) -> Self {
        Self {
            week_id: WeekCalendar::week_id(date),
            start_date: WeekCalendar::monday_of(date),
            clips: BTreeMap::new(),
            status: WeekStatus::Incomplete,
        }
    }

    pub fn week_id(&self) -> &WeekId {
        &self.week_id
    }

    /// Monday of this week
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Clips in ascending day order
    pub fn clips(&self) -> impl Iterator<Item = &ClipDescriptor> {
        self.clips.values()
    }

    /// Clips in ascending day order, cloned
    pub fn ordered_clips(&self) -> Vec<ClipDescriptor> {
        self.clips.values().cloned().collect()
    }

    pub fn clip(&self, day: DayIndex) -> Option<&ClipDescriptor> {
        self.clips.get(&day)
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn has_clips(&self) -> bool {
        !self.clips.is_empty()
    }

    /// Days that have a clip, ascending
    pub fn captured_days(&self) -> Vec<DayIndex> {
        self.clips.keys().copied().collect()
    }

    pub fn status(&self) -> &WeekStatus {
        &self.status
    }

    pub fn is_eligible_for_stitch(&self) -> bool {
        self.status.is_eligible()
    }

    pub fn generated_output_path(&self) -> Option<&Path> {
        match &self.status {
            WeekStatus::Generated { output_path, .. } => Some(output_path),
            _ => None,
        }
    }

    /// Insert or replace the clip for its day; returns the replaced clip
    pub fn insert_clip(
        &mut self,
        clip: ClipDescriptor,
        policy: &EligibilityPolicy,
    ) -> Option<ClipDescriptor> {
        let previous = self.clips.insert(clip.day_index(), clip);
        self.refresh_status(policy);
        previous
    }

    /// Recompute eligibility from the clip set. A recorded output is kept.
    pub fn refresh_status(&mut self, policy: &EligibilityPolicy) {
        let now_eligible = policy.is_eligible(self.clips.len());
        match &mut self.status {
            WeekStatus::Generated { eligible, .. } => *eligible = now_eligible,
            status => {
                *status = if now_eligible {
                    WeekStatus::Eligible
                } else {
                    WeekStatus::Incomplete
                };
            }
        }
    }

    /// Record the film for this week; eligibility is carried over
    pub fn set_generated_output(&mut self, output_path: impl Into<PathBuf>) {
        self.status = WeekStatus::Generated {
            output_path: output_path.into(),
            eligible: self.status.is_eligible(),
        };
    }

    /// Drop a recorded output and fall back to the derived eligibility
    pub fn clear_generated_output(&mut self, policy: &EligibilityPolicy) {
        self.status = WeekStatus::Incomplete;
        self.refresh_status(policy);
    }
}

#[cfg(test)]
mod tests;
