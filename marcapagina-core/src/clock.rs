//! Time source for the calculators and the store.
//!
//! Every "today", "this month" and "what hour was this session" question is
//! answered through a [`Clock`]. A clock pins a single instant together with a
//! single UTC offset:
//!
//! - `ReadingSession::date` values are compared against [`Clock::today`]
//! - `created_at` instants are converted with [`Clock::to_local`] before their
//!   hour or weekday is read
//! - new sessions are stamped with `clock.today()` by the store
//!
//! Using one offset for all three keeps streaks and time-of-day insights
//! consistent with each other. The default offset is the machine's local one;
//! `calendar.utc_offset` in the config file overrides it.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Utc};

/// A fixed "now" in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    now: DateTime<FixedOffset>,
}

impl Clock {
    /// Current instant in the machine's local offset.
    pub fn system() -> Self {
        let local = Local::now();
        Self {
            now: local.with_timezone(local.offset()),
        }
    }

    /// Current instant seen from an explicit offset.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            now: Utc::now().with_timezone(&offset),
        }
    }

    /// A clock frozen at `now` (tests, replays).
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }

    pub fn offset(&self) -> FixedOffset {
        *self.now.offset()
    }

    /// The reader's calendar day.
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Convert a stored instant into the clock's offset.
    pub fn to_local(&self, ts: DateTime<Utc>) -> DateTime<FixedOffset> {
        ts.with_timezone(&self.offset())
    }

    /// Day of the current month, 1-based.
    pub fn day_of_month(&self) -> u32 {
        self.today().day()
    }

    /// First day of the current month.
    pub fn first_of_month(&self) -> NaiveDate {
        let today = self.today();
        today.with_day(1).unwrap_or(today)
    }

    /// Number of days in the current month.
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.today())
    }

    /// Days left in the current month, today included.
    pub fn days_remaining_in_month(&self) -> u32 {
        self.days_in_month() - self.day_of_month() + 1
    }

    /// `(year, month)` of the month before the current one.
    pub fn previous_month(&self) -> (i32, u32) {
        let today = self.today();
        if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        }
    }
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_today_uses_clock_offset() {
        // 01:30 UTC on the 1st is still the previous evening in UTC-3
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 1, 30, 0).unwrap();
        let clock = Clock::at(instant.with_timezone(&brt()));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(clock.days_in_month(), 29);
        assert_eq!(clock.day_of_month(), 29);
        assert_eq!(clock.days_remaining_in_month(), 1);
    }

    #[test]
    fn test_month_helpers() {
        let clock = Clock::at(brt().with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap());
        assert_eq!(clock.first_of_month(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(clock.previous_month(), (2023, 12));
        assert_eq!(clock.days_remaining_in_month(), 22);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2023, 12, 5).unwrap()), 31);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2023, 4, 5).unwrap()), 30);
    }

    #[test]
    fn test_to_local_hour() {
        let clock = Clock::at(brt().with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap());
        let ts = Utc.with_ymd_and_hms(2024, 1, 10, 1, 0, 0).unwrap();
        let local = clock.to_local(ts);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(chrono::Timelike::hour(&local), 22);
    }
}
