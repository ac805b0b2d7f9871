//! Time source for lifecycle timestamps and default cutoff dates.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Supplies the current time to the engine.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Today's date on the wall clock at `offset` from UTC.
    fn today_in(&self, offset: FixedOffset) -> NaiveDate {
        self.now().with_timezone(&offset).date_naive()
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_today_in_utc() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 0).unwrap());
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(clock.today_in(utc), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[test]
    fn test_local_date_lags_utc_west_of_greenwich() {
        // 02:00 UTC on Feb 1 is still Jan 31 in Guatemala (UTC-6).
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 2, 1, 2, 0, 0).unwrap());
        let guatemala = FixedOffset::west_opt(6 * 3600).unwrap();
        assert_eq!(clock.today_in(guatemala), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }
}
