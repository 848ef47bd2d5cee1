// Clock adapters - Wall clock and a settable clock for tests

use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::ports::Clock;

/// Wall clock; "today" is the local calendar date
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a date until moved
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Move the clock to another date
    pub fn set(&self, today: NaiveDate) {
        if let Ok(mut slot) = self.today.lock() {
            *slot = today;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.today.lock() {
            Ok(today) => *today,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Noon UTC on the pinned date
    fn now(&self) -> DateTime<Utc> {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        Utc.from_utc_datetime(&self.today().and_time(noon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_moves() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());

        clock.set(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
        assert_eq!(clock.now().date_naive(), clock.today());
    }
}
