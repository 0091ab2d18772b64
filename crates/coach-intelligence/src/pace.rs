// ABOUTME: Linear pace expectations for daily targets such as water intake and steps
// ABOUTME: Compares actual progress with the share of the goal expected by a given time of day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Waking window over which a daily goal is expected to accumulate linearly
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaceWindow {
    /// Time progress starts accumulating
    pub start: NaiveTime,
    /// Time the full goal is expected
    pub end: NaiveTime,
}

impl Default for PaceWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl PaceWindow {
    /// Fraction of the window elapsed at `now`, clamped to `[0, 1]`
    #[must_use]
    pub fn elapsed_fraction(&self, now: NaiveTime) -> f64 {
        let total = (self.end - self.start).num_seconds();
        if total <= 0 {
            return 1.0;
        }
        let elapsed = (now - self.start).num_seconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// Amount of `goal` expected by `now` on a linear pace
#[must_use]
pub fn expected_progress(goal: f64, now: NaiveTime, window: &PaceWindow) -> f64 {
    goal.max(0.0) * window.elapsed_fraction(now)
}

/// How actual progress compares with the linear expectation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaceStatus {
    /// At or above `behind_ratio` of the expectation
    OnTrack,
    /// Below `behind_ratio` of the expectation
    Behind,
    /// Below `far_behind_ratio` of the expectation
    FarBehind,
}

impl PaceStatus {
    /// Classify `actual` against the expectation for `goal` at `now`
    ///
    /// Nothing is expected before the window opens, so early in the day every
    /// actual value is on track.
    #[must_use]
    pub fn evaluate(
        actual: f64,
        goal: f64,
        now: NaiveTime,
        window: &PaceWindow,
        behind_ratio: f64,
        far_behind_ratio: f64,
    ) -> Self {
        let expected = expected_progress(goal, now, window);
        if expected <= 0.0 {
            return Self::OnTrack;
        }
        let ratio = actual / expected;
        if ratio < far_behind_ratio {
            Self::FarBehind
        } else if ratio < behind_ratio {
            Self::Behind
        } else {
            Self::OnTrack
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_expected_progress_is_linear_inside_window() {
        let window = PaceWindow::default();
        assert!((expected_progress(3000.0, at(14, 30), &window) - 1500.0).abs() < 1e-9);
        assert!(expected_progress(3000.0, at(6, 0), &window).abs() < f64::EPSILON);
        assert!((expected_progress(3000.0, at(23, 0), &window) - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_thresholds() {
        let window = PaceWindow::default();
        // 5000 expected at 14:30 for a 10k goal
        assert_eq!(
            PaceStatus::evaluate(4000.0, 10_000.0, at(14, 30), &window, 0.75, 0.5),
            PaceStatus::OnTrack
        );
        assert_eq!(
            PaceStatus::evaluate(3000.0, 10_000.0, at(14, 30), &window, 0.75, 0.5),
            PaceStatus::Behind
        );
        assert_eq!(
            PaceStatus::evaluate(1000.0, 10_000.0, at(14, 30), &window, 0.75, 0.5),
            PaceStatus::FarBehind
        );
    }
}
