// ABOUTME: Built-in reminder rules for workouts, supplements, meals, water, steps, and check-ins
// ABOUTME: Each rule is a small stateless evaluator over the day snapshot and local time
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{Priority, Reminder, ReminderConfig, ReminderKind, ReminderRule, ReminderSnapshot};
use chrono::{NaiveDateTime, NaiveTime};
use coach_intelligence::{expected_progress, PaceStatus};

/// Scheduled workout not yet completed
pub struct WorkoutRule;

impl ReminderRule for WorkoutRule {
    fn name(&self) -> &'static str {
        "workout"
    }

    fn evaluate(
        &self,
        snapshot: &ReminderSnapshot,
        now: NaiveDateTime,
        config: &ReminderConfig,
    ) -> Vec<Reminder> {
        let Some(workout) = snapshot
            .program
            .as_ref()
            .and_then(|program| program.workout_for(snapshot.date))
        else {
            return Vec::new();
        };
        let done = snapshot
            .sessions
            .iter()
            .any(|session| session.date == snapshot.date && session.completed_at.is_some());
        let time = now.time();
        if done || time < config.workout_due {
            return Vec::new();
        }

        let overdue = time >= config.workout_overdue;
        vec![Reminder {
            id: format!("workout:{}", snapshot.date),
            kind: ReminderKind::Workout,
            priority: if overdue { Priority::High } else { Priority::Medium },
            title: if overdue {
                "Workout overdue".to_owned()
            } else {
                "Workout due".to_owned()
            },
            message: format!("{} is scheduled for today.", workout.name),
            due_at: Some(config.workout_due),
        }]
    }
}

/// Supplements past their scheduled time and not taken
pub struct SupplementRule;

impl ReminderRule for SupplementRule {
    fn name(&self) -> &'static str {
        "supplements"
    }

    fn evaluate(
        &self,
        snapshot: &ReminderSnapshot,
        now: NaiveDateTime,
        config: &ReminderConfig,
    ) -> Vec<Reminder> {
        snapshot
            .supplements
            .iter()
            .filter(|supplement| supplement.is_active)
            .filter(|supplement| {
                !snapshot
                    .supplement_logs
                    .iter()
                    .any(|log| log.supplement_id == supplement.id && log.date == snapshot.date)
            })
            .filter_map(|supplement| {
                let due = supplement.scheduled_time?;
                let late = now - snapshot.date.and_time(due);
                if late < chrono::Duration::zero() {
                    return None;
                }
                let overdue = late >= config.supplement_overdue_after;
                let dosage = supplement
                    .dosage
                    .as_deref()
                    .map(|d| format!(" ({d})"))
                    .unwrap_or_default();
                Some(Reminder {
                    id: format!("supplement:{}", supplement.id),
                    kind: ReminderKind::Supplement,
                    priority: if overdue { Priority::High } else { Priority::Medium },
                    title: format!("Take {}", supplement.name),
                    message: format!(
                        "{}{dosage} was scheduled for {}.",
                        supplement.name,
                        due.format("%H:%M")
                    ),
                    due_at: Some(due),
                })
            })
            .collect()
    }
}

/// Planned meals not logged within the grace period
pub struct MealRule;

impl ReminderRule for MealRule {
    fn name(&self) -> &'static str {
        "meals"
    }

    fn evaluate(
        &self,
        snapshot: &ReminderSnapshot,
        now: NaiveDateTime,
        config: &ReminderConfig,
    ) -> Vec<Reminder> {
        snapshot
            .meals
            .iter()
            .filter(|meal| {
                !snapshot
                    .meal_logs
                    .iter()
                    .any(|log| log.meal_id == meal.id && log.date == snapshot.date)
            })
            .filter_map(|meal| {
                let due = meal.scheduled_time?;
                if now - snapshot.date.and_time(due) < config.meal_grace {
                    return None;
                }
                Some(Reminder {
                    id: format!("meal:{}", meal.id),
                    kind: ReminderKind::Meal,
                    priority: Priority::Medium,
                    title: format!("Log {}", meal.name),
                    message: format!(
                        "{} was planned for {} and hasn't been logged.",
                        meal.name,
                        due.format("%H:%M")
                    ),
                    due_at: Some(due),
                })
            })
            .collect()
    }
}

fn pace_reminder(
    kind: ReminderKind,
    actual: f64,
    goal: f64,
    now: NaiveTime,
    config: &ReminderConfig,
    describe: impl FnOnce(f64) -> (String, String),
) -> Option<Reminder> {
    let priority = match PaceStatus::evaluate(
        actual,
        goal,
        now,
        &config.pace_window,
        config.behind_ratio,
        config.far_behind_ratio,
    ) {
        PaceStatus::OnTrack => return None,
        PaceStatus::Behind => Priority::Low,
        PaceStatus::FarBehind => Priority::Medium,
    };
    let expected = expected_progress(goal, now, &config.pace_window);
    let (title, message) = describe(expected);
    Some(Reminder {
        id: format!("{}:pace", kind.as_str()),
        kind,
        priority,
        title,
        message,
        due_at: None,
    })
}

/// Water intake behind the linear pace
pub struct WaterRule;

impl ReminderRule for WaterRule {
    fn name(&self) -> &'static str {
        "water"
    }

    fn evaluate(
        &self,
        snapshot: &ReminderSnapshot,
        now: NaiveDateTime,
        config: &ReminderConfig,
    ) -> Vec<Reminder> {
        let entry = snapshot.water.as_ref().filter(|w| w.date == snapshot.date);
        let actual = entry.map_or(0, |w| w.amount_ml);
        let goal = entry
            .and_then(|w| w.goal_ml)
            .filter(|g| *g > 0)
            .unwrap_or(config.default_water_goal_ml);
        pace_reminder(
            ReminderKind::Water,
            f64::from(actual),
            f64::from(goal),
            now.time(),
            config,
            |expected| {
                (
                    "Drink some water".to_owned(),
                    format!("{actual} ml so far; about {expected:.0} ml expected by now."),
                )
            },
        )
        .into_iter()
        .collect()
    }
}

/// Step count behind the linear pace
pub struct StepsRule;

impl ReminderRule for StepsRule {
    fn name(&self) -> &'static str {
        "steps"
    }

    fn evaluate(
        &self,
        snapshot: &ReminderSnapshot,
        now: NaiveDateTime,
        config: &ReminderConfig,
    ) -> Vec<Reminder> {
        let entry = snapshot.steps.as_ref().filter(|s| s.date == snapshot.date);
        let actual = entry.map_or(0, |s| s.steps);
        let goal = entry
            .and_then(|s| s.goal)
            .filter(|g| *g > 0)
            .unwrap_or(config.default_step_goal);
        pace_reminder(
            ReminderKind::Steps,
            f64::from(actual),
            f64::from(goal),
            now.time(),
            config,
            |expected| {
                (
                    "Time for a walk".to_owned(),
                    format!("{actual} steps so far; about {expected:.0} expected by now."),
                )
            },
        )
        .into_iter()
        .collect()
    }
}

/// Check-in overdue by day count
pub struct CheckInRule;

impl ReminderRule for CheckInRule {
    fn name(&self) -> &'static str {
        "check_in"
    }

    fn evaluate(
        &self,
        snapshot: &ReminderSnapshot,
        _now: NaiveDateTime,
        config: &ReminderConfig,
    ) -> Vec<Reminder> {
        let interval = config.check_in_interval_days.max(1);
        let (priority, message) = match &snapshot.last_check_in {
            None => (
                Priority::Medium,
                "Send your coach a first check-in.".to_owned(),
            ),
            Some(check_in) => {
                let days = (snapshot.date - check_in.date).num_days();
                if days < interval {
                    return Vec::new();
                }
                let priority = if days >= interval * 2 {
                    Priority::High
                } else {
                    Priority::Medium
                };
                (priority, format!("Your last check-in was {days} days ago."))
            }
        };
        vec![Reminder {
            id: format!("check_in:{}", snapshot.date),
            kind: ReminderKind::CheckIn,
            priority,
            title: "Check-in due".to_owned(),
            message,
            due_at: None,
        }]
    }
}
