// ABOUTME: Default daily targets used when an athlete has no explicit goal
// ABOUTME: Step count, water intake, and the check-in cadence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Daily step goal
pub const DEFAULT_STEP_GOAL: u32 = 10_000;

/// Daily water goal in milliliters
pub const DEFAULT_WATER_GOAL_ML: u32 = 3_000;

/// Days between check-ins
pub const DEFAULT_CHECK_IN_INTERVAL_DAYS: i64 = 7;
