// Week calendar - ISO-8601 week arithmetic over plain dates

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::model::{DayIndex, WeekId};

/// Pure week/day computations.
///
/// Weeks start on Monday and are numbered by the ISO-8601 week-numbering
/// year, so the last days of December can belong to week 1 of the next
/// year and the first days of January to week 52/53 of the previous one.
pub struct WeekCalendar;

impl WeekCalendar {
    /// ISO week identifier (`YYYY-Www`) of the week containing `date`
    pub fn week_id(date: NaiveDate) -> WeekId {
        let iso = date.iso_week();
        WeekId::from_parts(iso.year(), iso.week())
    }

    /// Day index within the week, 0 = Monday .. 6 = Sunday
    pub fn day_index(date: NaiveDate) -> DayIndex {
        DayIndex::from_weekday(date.weekday())
    }

    /// Monday 00:00:00 of the week containing `date`
    pub fn week_start(date: NaiveDate) -> NaiveDateTime {
        Self::monday_of(date).and_time(NaiveTime::MIN)
    }

    /// Monday of the week containing `date`
    pub fn monday_of(date: NaiveDate) -> NaiveDate {
        let offset = u64::from(date.weekday().num_days_from_monday());
        date.checked_sub_days(Days::new(offset))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Sunday of the week containing `date`
    pub fn week_end(date: NaiveDate) -> NaiveDate {
        Self::monday_of(date)
            .checked_add_days(Days::new(6))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Calendar date of `day` within the week containing `date`
    pub fn date_of(date: NaiveDate, day: DayIndex) -> NaiveDate {
        Self::monday_of(date)
            .checked_add_days(Days::new(u64::from(day.value())))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Short human label for the week, e.g. `Jan 5 - 11` or `Dec 29 - Jan 4`
    pub fn range_label(date: NaiveDate) -> String {
        let first = Self::monday_of(date);
        let last = Self::week_end(date);

        if first.month() == last.month() {
            format!("{} - {}", first.format("%b %-d"), last.day())
        } else {
            format!("{} - {}", first.format("%b %-d"), last.format("%b %-d"))
        }
    }
}
