//! Time source for the pipeline.
//!
//! "Today" decides who counts as present, so every time-dependent
//! computation reads it through a [`Clock`] that tests can pin.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};

/// Source of the current instant and the current local calendar date.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in the school's local time zone.
    fn today(&self) -> NaiveDate;

    /// UTC offset of the school's local time zone at `at`.
    fn offset_at(&self, at: DateTime<Utc>) -> FixedOffset;

    /// `at` shifted into the school's local time zone.
    fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset_at(at))
    }
}

/// Wall clock using the host's local time zone for [`Clock::today`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn offset_at(&self, at: DateTime<Utc>) -> FixedOffset {
        Local.offset_from_utc_datetime(&at.naive_utc()).fix()
    }
}

/// Clock frozen at a given instant and date, in a fixed time zone (UTC
/// unless set with [`FixedClock::with_offset`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: NaiveDate,
    offset: FixedOffset,
}

impl FixedClock {
    /// Freezes time at `now`, with `today` as the local date.
    #[must_use]
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self {
            now,
            today,
            offset: Utc.fix(),
        }
    }

    /// Freezes time at midday UTC of `today`.
    #[must_use]
    pub fn at_date(today: NaiveDate) -> Self {
        let now = today
            .and_hms_opt(12, 0, 0)
            .map_or_else(Utc::now, |dt| dt.and_utc());
        Self::new(now, today)
    }

    /// Uses `offset` as the local time zone.
    #[must_use]
    pub const fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }

    fn offset_at(&self, _at: DateTime<Utc>) -> FixedOffset {
        self.offset
    }
}

/// Formats a date as the `YYYY-MM-DD` key used in attendance sets.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap_or_default();
        assert_eq!(date_key(date), "2024-03-05");
    }

    #[test]
    fn fixed_clock_returns_pinned_values() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().date_naive(), date);
    }

    #[test]
    fn local_applies_the_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default();
        let west = FixedOffset::west_opt(5 * 3600).unwrap_or(Utc.fix());
        let clock = FixedClock::at_date(date).with_offset(west);
        let late = Utc
            .with_ymd_and_hms(2024, 3, 16, 3, 30, 0)
            .single()
            .unwrap_or_default();
        assert_eq!(clock.local(late).date_naive(), date);
    }
}
