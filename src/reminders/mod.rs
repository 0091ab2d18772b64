// ABOUTME: Local reminder generation from a declarative table of rules
// ABOUTME: Evaluates each rule against a fresh snapshot of today's data and sorts by priority
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Reminders
//!
//! Reminders are computed on the device from a [`ReminderSnapshot`] of the
//! athlete's day. Each [`ReminderRule`] inspects the snapshot and the local
//! time and yields zero or more [`Reminder`]s; the generator concatenates
//! them and orders by priority (`high` first), then by due time.

/// Built-in rules
pub mod rules;
/// Data the rules are evaluated against
pub mod snapshot;

pub use rules::{CheckInRule, MealRule, StepsRule, SupplementRule, WaterRule, WorkoutRule};
pub use snapshot::ReminderSnapshot;

use crate::context::AppContext;
use crate::errors::AppResult;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use coach_core::constants::goals::{
    DEFAULT_CHECK_IN_INTERVAL_DAYS, DEFAULT_STEP_GOAL, DEFAULT_WATER_GOAL_ML,
};
use coach_intelligence::PaceWindow;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

/// Urgency of a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to know
    Low,
    /// Should be acted on today
    Medium,
    /// Overdue
    High,
}

/// What a reminder is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Scheduled workout not done
    Workout,
    /// Supplement not taken
    Supplement,
    /// Meal not logged
    Meal,
    /// Water intake behind pace
    Water,
    /// Step count behind pace
    Steps,
    /// Check-in overdue
    CheckIn,
}

impl ReminderKind {
    /// Stable string form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Supplement => "supplement",
            Self::Meal => "meal",
            Self::Water => "water",
            Self::Steps => "steps",
            Self::CheckIn => "check_in",
        }
    }
}

/// A reminder to show the athlete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Stable id for deduplication on the device, e.g. `supplement:{id}`
    pub id: String,
    /// Subject
    pub kind: ReminderKind,
    /// Urgency
    pub priority: Priority,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
    /// Local time the action was due
    pub due_at: Option<NaiveTime>,
}

/// Thresholds used by the built-in rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderConfig {
    /// A scheduled workout becomes due at this time
    pub workout_due: NaiveTime,
    /// A scheduled workout becomes overdue at this time
    pub workout_overdue: NaiveTime,
    /// A supplement this late is high priority
    pub supplement_overdue_after: Duration,
    /// A meal is overdue this long after its scheduled time
    pub meal_grace: Duration,
    /// Waking window for water and step pacing
    pub pace_window: PaceWindow,
    /// Below this share of the expected progress a target is behind
    pub behind_ratio: f64,
    /// Below this share it is far behind
    pub far_behind_ratio: f64,
    /// Water goal when the day has none
    pub default_water_goal_ml: u32,
    /// Step goal when the day has none
    pub default_step_goal: u32,
    /// Days between check-ins
    pub check_in_interval_days: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            workout_due: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            workout_overdue: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
            supplement_overdue_after: Duration::hours(2),
            meal_grace: Duration::minutes(60),
            pace_window: PaceWindow::default(),
            behind_ratio: 0.75,
            far_behind_ratio: 0.5,
            default_water_goal_ml: DEFAULT_WATER_GOAL_ML,
            default_step_goal: DEFAULT_STEP_GOAL,
            check_in_interval_days: DEFAULT_CHECK_IN_INTERVAL_DAYS,
        }
    }
}

/// One entry of the rule table
pub trait ReminderRule: Send + Sync {
    /// Rule name for logs
    fn name(&self) -> &'static str;

    /// Reminders this rule raises for `snapshot` at local time `now`
    fn evaluate(
        &self,
        snapshot: &ReminderSnapshot,
        now: NaiveDateTime,
        config: &ReminderConfig,
    ) -> Vec<Reminder>;
}

/// Evaluates a table of rules
pub struct ReminderGenerator {
    rules: Vec<Box<dyn ReminderRule>>,
    config: ReminderConfig,
}

impl Default for ReminderGenerator {
    fn default() -> Self {
        Self::new(ReminderConfig::default())
    }
}

impl ReminderGenerator {
    /// Generator with every built-in rule
    #[must_use]
    pub fn new(config: ReminderConfig) -> Self {
        Self {
            rules: vec![
                Box::new(WorkoutRule),
                Box::new(SupplementRule),
                Box::new(MealRule),
                Box::new(WaterRule),
                Box::new(StepsRule),
                Box::new(CheckInRule),
            ],
            config,
        }
    }

    /// Generator with a custom rule table
    #[must_use]
    pub fn with_rules(rules: Vec<Box<dyn ReminderRule>>, config: ReminderConfig) -> Self {
        Self { rules, config }
    }

    /// Thresholds in use
    #[must_use]
    pub const fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Reminders for `snapshot` at local time `now`, most urgent first
    #[must_use]
    pub fn generate(&self, snapshot: &ReminderSnapshot, now: NaiveDateTime) -> Vec<Reminder> {
        let mut reminders: Vec<Reminder> = self
            .rules
            .iter()
            .flat_map(|rule| {
                let raised = rule.evaluate(snapshot, now, &self.config);
                debug!(rule = rule.name(), raised = raised.len(), "Reminder rule evaluated");
                raised
            })
            .collect();
        reminders.sort_by_key(|r| (Reverse(r.priority), r.due_at.is_none(), r.due_at));
        reminders
    }

    /// Fetch today's data for the signed-in athlete and generate reminders
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the backend cannot be read
    pub async fn generate_for(&self, ctx: &AppContext) -> AppResult<Vec<Reminder>> {
        let user_id = ctx.require_user().await?;
        let now = ctx.clock.now();
        let snapshot =
            ReminderSnapshot::fetch(ctx.backend.as_ref(), user_id, now.date_naive()).await?;
        Ok(self.generate(&snapshot, now.naive_local()))
    }
}
