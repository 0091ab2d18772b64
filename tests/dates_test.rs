// ABOUTME: Tests for local calendar dates and the injectable clocks
// ABOUTME: Late evenings west of UTC must stay on the local day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use pierre_coach::dates::{local_date_string, Clock, FixedClock, SystemClock};

#[test]
fn test_late_evening_keeps_local_date() {
    let late = DateTime::parse_from_rfc3339("2025-03-10T23:30:00-05:00").unwrap();
    assert_eq!(local_date_string(&late), "2025-03-10");
    assert_eq!(local_date_string(&late.with_timezone(&Utc)), "2025-03-11");

    let clock = FixedClock::new(late);
    assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    assert_eq!(clock.today_string(), "2025-03-10");
    assert_eq!(clock.now_utc().date_naive().to_string(), "2025-03-11");
}

#[test]
fn test_early_morning_east_of_utc() {
    let early = DateTime::parse_from_rfc3339("2025-03-10T00:15:00+09:00").unwrap();
    let clock = FixedClock::new(early);
    assert_eq!(clock.today_string(), "2025-03-10");
    assert_eq!(clock.now_utc().date_naive().to_string(), "2025-03-09");
}

#[test]
fn test_fixed_clock_set_and_advance() {
    let start = DateTime::parse_from_rfc3339("2025-03-10T09:00:00-05:00").unwrap();
    let clock = FixedClock::new(start);
    clock.advance(Duration::hours(15));
    assert_eq!(clock.today_string(), "2025-03-11");
    assert_eq!(clock.now(), start + Duration::hours(15));

    clock.set(start);
    assert_eq!(clock.now(), start);
}

#[test]
fn test_system_clock_uses_device_offset() {
    let before = Local::now().date_naive();
    let today = SystemClock.today();
    let after = Local::now().date_naive();
    assert!(today == before || today == after);
}
