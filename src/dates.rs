// ABOUTME: Local calendar date helpers and an injectable clock
// ABOUTME: Dates are taken in the device's local offset so late evenings never roll over to UTC
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};
use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};

/// `YYYY-MM-DD` of `now` in its own offset
///
/// The date is read from the local wall clock, never from the UTC instant:
/// 23:30 at UTC-5 is still the same day even though UTC is already past midnight.
#[must_use]
pub fn local_date_string<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    now.date_naive().format("%Y-%m-%d").to_string()
}

/// Source of the current local time
pub trait Clock: Send + Sync {
    /// Current time in the device's local offset
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current instant in UTC
    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    /// Local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Local calendar date as `YYYY-MM-DD`
    fn today_string(&self) -> String {
        local_date_string(&self.now())
    }
}

/// Wall clock of the host in its local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually controlled clock for tests and the CLI `--at` option
#[derive(Debug)]
pub struct FixedClock {
    offset_secs: AtomicI32,
    millis: AtomicI64,
}

impl FixedClock {
    /// Clock frozen at `at`
    #[must_use]
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self {
            offset_secs: AtomicI32::new(at.offset().local_minus_utc()),
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    /// Move the clock to `at`, adopting its offset
    pub fn set(&self, at: DateTime<FixedOffset>) {
        self.offset_secs
            .store(at.offset().local_minus_utc(), Ordering::SeqCst);
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.offset_secs.load(Ordering::SeqCst))
            .unwrap_or_else(|| Utc.fix());
        let millis = self.millis.load(Ordering::SeqCst);
        offset
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(|| Utc::now().with_timezone(&offset))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advance() {
        let start = DateTime::parse_from_rfc3339("2025-03-10T23:30:00-05:00").unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.today_string(), "2025-03-10");
        clock.advance(Duration::hours(1));
        assert_eq!(clock.today_string(), "2025-03-11");
        assert_eq!(clock.now().offset(), start.offset());
    }

    #[test]
    fn test_fixed_clock_set_adopts_new_offset() {
        let start = DateTime::parse_from_rfc3339("2025-03-10T23:30:00-05:00").unwrap();
        let clock = FixedClock::new(start);

        let tokyo = DateTime::parse_from_rfc3339("2025-03-11T08:15:00+09:00").unwrap();
        clock.set(tokyo);
        assert_eq!(clock.now(), tokyo);
        assert_eq!(clock.now().offset().local_minus_utc(), 9 * 3600);
        assert_eq!(clock.today_string(), "2025-03-11");
        assert_eq!(clock.now().format("%H:%M").to_string(), "08:15");
    }
}
