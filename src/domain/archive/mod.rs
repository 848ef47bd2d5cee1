// History archive - Bounded, most-recent-first list of past weeks

use std::collections::VecDeque;

use crate::domain::model::{WeekId, WeekRecord};

/// Default number of past weeks kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Past weeks, newest first. Pushing past capacity evicts the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryArchive {
    weeks: VecDeque<WeekRecord>,
    capacity: usize,
}

impl Default for HistoryArchive {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryArchive {
    /// Empty archive holding at most `capacity` weeks (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            weeks: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild from persisted weeks (newest first), dropping overflow.
    /// Repeated week ids are kept; lookups resolve to the newest.
    pub fn from_weeks(weeks: Vec<WeekRecord>, capacity: usize) -> Self {
        let mut archive = Self::with_capacity(capacity);
        archive
            .weeks
            .extend(weeks.into_iter().take(archive.capacity));
        archive
    }

    /// Insert at the front; returns the evicted oldest week, if any
    pub fn push(&mut self, week: WeekRecord) -> Option<WeekRecord> {
        self.weeks.push_front(week);
        if self.weeks.len() > self.capacity {
            self.weeks.pop_back()
        } else {
            None
        }
    }

    pub fn get(&self, week_id: &WeekId) -> Option<&WeekRecord> {
        self.weeks.iter().find(|w| w.week_id() == week_id)
    }

    pub fn get_mut(&mut self, week_id: &WeekId) -> Option<&mut WeekRecord> {
        self.weeks.iter_mut().find(|w| w.week_id() == week_id)
    }

    /// Weeks newest first
    pub fn iter(&self) -> impl Iterator<Item = &WeekRecord> {
        self.weeks.iter()
    }

    pub fn to_vec(&self) -> Vec<WeekRecord> {
        self.weeks.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
