// ABOUTME: Tests for local reminder generation across all built-in rules
// ABOUTME: Due and overdue thresholds, pace checks, check-in cadence, and priority ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod helpers;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use helpers::fixtures::test_app;
use pierre_coach::models::{
    CheckIn, DayOfWeek, Meal, MealType, PlannedExercise, ScheduledDay, StepEntry, Supplement,
    SupplementLog, WaterEntry, Workout, WorkoutProgram, WorkoutSession,
};
use pierre_coach::reminders::{
    Priority, Reminder, ReminderConfig, ReminderGenerator, ReminderKind, ReminderRule,
    ReminderSnapshot,
};
use serde_json::json;
use uuid::Uuid;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    monday().and_time(time(hour, minute))
}

fn program() -> WorkoutProgram {
    WorkoutProgram {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        name: "Upper / Lower".to_owned(),
        is_active: true,
        schedule: vec![
            ScheduledDay {
                day: DayOfWeek::Monday,
                workout: Some(Workout {
                    name: "Upper A".to_owned(),
                    focus: None,
                    exercises: vec![PlannedExercise {
                        name: "Bench Press".to_owned(),
                        exercise_id: None,
                        sets: 4,
                        reps: "6-8".to_owned(),
                        rest_seconds: None,
                        notes: None,
                    }],
                }),
            },
            ScheduledDay {
                day: DayOfWeek::Tuesday,
                workout: None,
            },
        ],
    }
}

fn supplement(name: &str, at: Option<NaiveTime>) -> Supplement {
    Supplement {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        name: name.to_owned(),
        dosage: Some("5 g".to_owned()),
        scheduled_time: at,
        is_active: true,
    }
}

fn meal(name: &str, at: NaiveTime) -> Meal {
    Meal {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        name: name.to_owned(),
        day_type: None,
        meal_type: MealType::Lunch,
        scheduled_time: Some(at),
        food_items: Vec::new(),
    }
}

fn check_in(date: NaiveDate) -> CheckIn {
    CheckIn {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        date,
        weight_kg: Some(82.4),
        notes: None,
    }
}

/// A Monday with a bit of everything left to do
fn busy_monday() -> ReminderSnapshot {
    let creatine = supplement("Creatine", Some(time(8, 0)));
    let fish_oil = supplement("Fish Oil", Some(time(8, 0)));
    let fish_oil_log = SupplementLog {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        supplement_id: fish_oil.id,
        date: monday(),
        taken_at: Utc::now(),
    };
    ReminderSnapshot {
        date: monday(),
        program: Some(program()),
        sessions: Vec::new(),
        supplements: vec![
            creatine,
            fish_oil,
            supplement("Vitamin D", Some(time(20, 0))),
            supplement("Zinc", None),
        ],
        supplement_logs: vec![fish_oil_log],
        meals: vec![meal("Lunch", time(12, 30)), meal("Dinner", time(19, 0))],
        meal_logs: Vec::new(),
        water: Some(WaterEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: monday(),
            amount_ml: 2_000,
            goal_ml: None,
        }),
        steps: Some(StepEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: monday(),
            steps: 1_000,
            goal: None,
        }),
        last_check_in: Some(check_in(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())),
    }
}

fn kinds(reminders: &[Reminder]) -> Vec<ReminderKind> {
    reminders.iter().map(|r| r.kind).collect()
}

#[test]
fn test_evening_reminders_are_ordered_by_priority_then_due_time() {
    let reminders = ReminderGenerator::default().generate(&busy_monday(), monday_at(18, 30));

    assert_eq!(
        kinds(&reminders),
        vec![
            ReminderKind::Supplement,
            ReminderKind::Meal,
            ReminderKind::Workout,
            ReminderKind::Steps,
            ReminderKind::CheckIn,
        ]
    );
    assert_eq!(reminders[0].priority, Priority::High);
    assert_eq!(reminders[0].title, "Take Creatine");
    assert_eq!(reminders[0].message, "Creatine (5 g) was scheduled for 08:00.");
    assert_eq!(reminders[1].title, "Log Lunch");
    assert_eq!(reminders[2].title, "Workout due");
    assert_eq!(reminders[2].message, "Upper A is scheduled for today.");
    assert!(reminders[1..].iter().all(|r| r.priority == Priority::Medium));
}

#[test]
fn test_early_morning_is_quiet() {
    let mut snapshot = busy_monday();
    snapshot.last_check_in = Some(check_in(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()));

    let reminders = ReminderGenerator::default().generate(&snapshot, monday_at(6, 30));
    assert!(reminders.is_empty(), "{reminders:?}");
}

#[test]
fn test_workout_overdue_and_completed() {
    let generator = ReminderGenerator::default();
    let snapshot = ReminderSnapshot {
        date: monday(),
        program: Some(program()),
        last_check_in: Some(check_in(monday())),
        ..ReminderSnapshot::default()
    };
    let late = generator.generate(&snapshot, monday_at(21, 0));
    let workout = late.iter().find(|r| r.kind == ReminderKind::Workout).unwrap();
    assert_eq!(workout.priority, Priority::High);
    assert_eq!(workout.title, "Workout overdue");

    let mut done = snapshot.clone();
    done.sessions.push(WorkoutSession {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        program_id: None,
        workout_name: "Upper A".to_owned(),
        date: monday(),
        started_at: Utc::now(),
        completed_at: Some(Utc::now()),
    });
    let reminders = generator.generate(&done, monday_at(21, 0));
    assert!(reminders.iter().all(|r| r.kind != ReminderKind::Workout));

    let mut rest_day = snapshot;
    rest_day.date = monday().succ_opt().unwrap();
    let reminders = generator.generate(&rest_day, rest_day.date.and_time(time(21, 0)));
    assert!(reminders.iter().all(|r| r.kind != ReminderKind::Workout));
}

#[test]
fn test_supplement_just_due_is_medium() {
    let snapshot = ReminderSnapshot {
        date: monday(),
        supplements: vec![supplement("Creatine", Some(time(8, 0)))],
        last_check_in: Some(check_in(monday())),
        ..ReminderSnapshot::default()
    };
    let reminders = ReminderGenerator::default().generate(&snapshot, monday_at(8, 30));
    let reminder = reminders
        .iter()
        .find(|r| r.kind == ReminderKind::Supplement)
        .unwrap();
    assert_eq!(reminder.priority, Priority::Medium);
    assert_eq!(reminder.due_at, Some(time(8, 0)));
}

#[test]
fn test_check_in_cadence() {
    let generator = ReminderGenerator::default();
    let check_ins = |snapshot: &ReminderSnapshot| -> Vec<Reminder> {
        generator
            .generate(snapshot, monday_at(6, 0))
            .into_iter()
            .filter(|r| r.kind == ReminderKind::CheckIn)
            .collect()
    };

    let first = ReminderSnapshot {
        date: monday(),
        ..ReminderSnapshot::default()
    };
    let reminders = check_ins(&first);
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].priority, Priority::Medium);
    assert_eq!(reminders[0].message, "Send your coach a first check-in.");

    let long_ago = ReminderSnapshot {
        last_check_in: Some(check_in(NaiveDate::from_ymd_opt(2025, 2, 20).unwrap())),
        ..first.clone()
    };
    let reminders = check_ins(&long_ago);
    assert_eq!(reminders[0].priority, Priority::High);
    assert_eq!(reminders[0].message, "Your last check-in was 18 days ago.");

    let recent = ReminderSnapshot {
        last_check_in: Some(check_in(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())),
        ..first
    };
    assert!(check_ins(&recent).is_empty());
}

#[test]
fn test_custom_rule_table() {
    struct Always;

    impl ReminderRule for Always {
        fn name(&self) -> &'static str {
            "always"
        }

        fn evaluate(
            &self,
            snapshot: &ReminderSnapshot,
            _now: NaiveDateTime,
            _config: &ReminderConfig,
        ) -> Vec<Reminder> {
            vec![Reminder {
                id: format!("custom:{}", snapshot.date),
                kind: ReminderKind::Water,
                priority: Priority::Low,
                title: "Stretch".to_owned(),
                message: "Five minutes of mobility.".to_owned(),
                due_at: None,
            }]
        }
    }

    let generator = ReminderGenerator::with_rules(vec![Box::new(Always)], ReminderConfig::default());
    let reminders = generator.generate(&busy_monday(), monday_at(18, 30));
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].id, "custom:2025-03-10");
}

#[tokio::test]
async fn test_generate_for_reads_fresh_backend_data() -> Result<()> {
    let app = test_app().await;
    let creatine = Uuid::new_v4();
    app.backend
        .seed(
            "athlete_supplements",
            vec![json!({ "id": creatine, "user_id": app.user_id, "name": "Creatine",
                         "scheduled_time": "06:00:00", "is_active": true })],
        )
        .await;
    app.backend
        .seed(
            "check_ins",
            vec![
                json!({ "id": Uuid::new_v4(), "user_id": app.user_id, "date": "2025-02-01" }),
                json!({ "id": Uuid::new_v4(), "user_id": app.user_id, "date": "2025-03-08" }),
            ],
        )
        .await;

    // 09:00 local: creatine is three hours late, nothing logged for steps or water
    let reminders = ReminderGenerator::default().generate_for(&app.ctx).await?;
    assert_eq!(
        kinds(&reminders),
        vec![ReminderKind::Supplement, ReminderKind::Water, ReminderKind::Steps]
    );
    assert_eq!(reminders[0].id, format!("supplement:{creatine}"));
    assert_eq!(reminders[0].priority, Priority::High);
    Ok(())
}

#[tokio::test]
async fn test_generate_for_requires_a_session() -> Result<()> {
    let app = test_app().await;
    app.ctx.sign_out().await?;
    assert!(ReminderGenerator::default().generate_for(&app.ctx).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_snapshot_keeps_meals_of_todays_day_type() -> Result<()> {
    let app = test_app().await;
    app.backend
        .seed(
            "day_type_assignments",
            vec![json!({ "user_id": app.user_id, "date": "2025-03-10", "day_type": "Rest Day" })],
        )
        .await;
    let meal = |name: &str, day_type: Option<&str>, at: &str| {
        json!({ "id": Uuid::new_v4(), "user_id": app.user_id, "name": name,
                "day_type": day_type, "scheduled_time": at })
    };
    app.backend
        .seed(
            "meals",
            vec![
                meal("Oats", Some("Training Day"), "07:00:00"),
                meal("Eggs", Some("Rest Day"), "08:00:00"),
                meal("Shake", None, "16:00:00"),
            ],
        )
        .await;

    let snapshot = ReminderSnapshot::fetch(app.ctx.backend.as_ref(), app.user_id, monday()).await?;
    let names: Vec<&str> = snapshot.meals.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Eggs", "Shake"]);
    Ok(())
}
