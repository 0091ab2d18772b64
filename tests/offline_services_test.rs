// ABOUTME: Integration tests for the offline-aware supplement, step, workout, and nutrition services
// ABOUTME: Online fetch, cache fallback, staleness across midnight, optimistic queueing, and sign-out
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod helpers;

use anyhow::Result;
use chrono::{Duration, Utc};
use helpers::fixtures::{at, test_app, TestApp};
use pierre_coach::errors::ErrorCode;
use pierre_coach::models::{EntityType, QueueAction};
use pierre_coach::offline::{
    NewWorkoutSet, NutritionToday, OfflineNutrition, OfflineSteps, OfflineSupplements,
    OfflineWorkout,
};
use serde_json::{json, Value};
use uuid::Uuid;

const TODAY: &str = "2025-03-10";

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

async fn seed_supplements(app: &TestApp) -> (Uuid, Uuid) {
    let creatine = Uuid::new_v4();
    let vitamin_d = Uuid::new_v4();
    app.backend
        .seed(
            "athlete_supplements",
            vec![
                json!({ "id": vitamin_d, "user_id": app.user_id, "name": "Vitamin D",
                        "dosage": "2000 IU", "scheduled_time": "20:00:00", "is_active": true }),
                json!({ "id": creatine, "user_id": app.user_id, "name": "Creatine",
                        "dosage": "5 g", "scheduled_time": "08:00:00", "is_active": true }),
                json!({ "id": Uuid::new_v4(), "user_id": app.user_id, "name": "Old",
                        "scheduled_time": "09:00:00", "is_active": false }),
            ],
        )
        .await;
    app.backend
        .seed(
            "supplement_logs",
            vec![json!({ "id": Uuid::new_v4(), "user_id": app.user_id, "supplement_id": creatine,
                         "date": TODAY, "taken_at": "2025-03-10T13:05:00Z" })],
        )
        .await;
    (creatine, vitamin_d)
}

fn meal(
    app: &TestApp,
    name: &str,
    day_type: Option<&str>,
    time: &str,
    foods: &[(&str, f64, f64)],
) -> Value {
    let id = Uuid::new_v4();
    let items: Vec<Value> = foods
        .iter()
        .map(|(food, calories, grams)| {
            json!({
                "id": Uuid::new_v4(),
                "meal_id": id,
                "food_item": {
                    "name": food,
                    "calories_per_100g": calories,
                    "protein_per_100g": 10.0,
                    "carbs_per_100g": 10.0,
                    "fat_per_100g": 5.0
                },
                "quantity": grams,
                "unit": "g"
            })
        })
        .collect();
    json!({
        "id": id,
        "user_id": app.user_id,
        "name": name,
        "day_type": day_type,
        "meal_type": "lunch",
        "scheduled_time": time,
        "meal_food_items": items
    })
}

async fn seed_nutrition(app: &TestApp) {
    app.backend
        .seed(
            "day_type_assignments",
            vec![json!({ "user_id": app.user_id, "date": TODAY, "day_type": "Training Day" })],
        )
        .await;
    app.backend
        .seed(
            "meals",
            vec![
                meal(
                    app,
                    "Chicken & Rice",
                    None,
                    "12:30:00",
                    &[("Chicken", 165.0, 150.0), ("Rice", 130.0, 200.0)],
                ),
                meal(app, "Oats", Some("Training Day"), "07:30:00", &[("Oats", 389.0, 100.0)]),
                meal(
                    app,
                    "Rest Day Salad",
                    Some("Rest Day"),
                    "13:00:00",
                    &[("Lettuce", 15.0, 100.0)],
                ),
            ],
        )
        .await;
}

async fn seed_program(app: &TestApp) -> Uuid {
    let id = Uuid::new_v4();
    app.backend
        .seed(
            "workout_programs",
            vec![json!({
                "id": id,
                "user_id": app.user_id,
                "name": "Upper / Lower",
                "is_active": true,
                "schedule": [
                    { "day": "monday", "workout": {
                        "name": "Upper A",
                        "focus": "Push",
                        "exercises": [
                            { "name": "Bench Press", "sets": 4, "reps": "6-8", "rest_seconds": 120 },
                            { "name": "Barbell Row", "sets": 4, "reps": "8" }
                        ]
                    }},
                    { "day": "tuesday", "workout": null },
                    { "day": "wednesday", "workout": { "name": "Lower A", "exercises": [] } }
                ]
            })],
        )
        .await;
    id
}

#[tokio::test]
async fn test_supplements_online_then_offline_from_cache() -> Result<()> {
    let app = test_app().await;
    let (creatine, _) = seed_supplements(&app).await;
    let service = OfflineSupplements::new(&app.ctx);

    let online = service.load().await?;
    assert!(!online.is_from_cache);
    assert!(online.error.is_none());
    let today = online.data.clone().unwrap();
    assert_eq!(today.items.len(), 2);
    assert_eq!(today.items[0].supplement.id, creatine);
    assert!(today.items[0].taken);
    assert_eq!(today.taken_count, 1);
    assert_eq!(today.pending_count, 1);

    app.ctx.connectivity.set_online(false);
    let offline = service.load().await?;
    assert!(offline.is_from_cache);
    assert!(!offline.is_stale);
    assert_eq!(offline.data.unwrap(), today);
    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_falls_back_to_cache() -> Result<()> {
    let app = test_app().await;
    seed_supplements(&app).await;
    let service = OfflineSupplements::new(&app.ctx);
    service.load().await?;

    app.backend.set_available(false);
    let snapshot = service.load().await?;
    assert!(snapshot.is_from_cache);
    assert_eq!(snapshot.data.unwrap().taken_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_cached_day_goes_stale_after_midnight() -> Result<()> {
    let app = test_app().await;
    seed_supplements(&app).await;
    let service = OfflineSupplements::new(&app.ctx);
    service.load().await?;

    app.ctx.connectivity.set_online(false);
    app.clock.advance(Duration::days(1));
    let snapshot = service.load().await?;

    assert!(snapshot.is_from_cache);
    assert!(snapshot.is_stale);
    let data = snapshot.data.unwrap();
    assert_eq!(data.taken_count, 0);
    assert_eq!(data.pending_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_no_cache_reports_user_facing_errors() -> Result<()> {
    let app = test_app().await;

    app.backend.set_available(false);
    let online = OfflineSupplements::new(&app.ctx).load().await?;
    assert!(online.data.is_none());
    assert_eq!(
        online.error.as_deref(),
        Some("Unable to load supplements. Please check your connection and try again.")
    );

    app.ctx.connectivity.set_online(false);
    let steps = OfflineSteps::new(&app.ctx).load().await?;
    assert_eq!(
        steps.error.as_deref(),
        Some("You're offline and no step counts have been saved on this device yet.")
    );
    let meals = OfflineNutrition::new(&app.ctx).load().await?;
    assert_eq!(
        meals.error.as_deref(),
        Some("You're offline and no meals have been saved on this device yet.")
    );
    Ok(())
}

#[tokio::test]
async fn test_offline_supplement_intake_is_optimistic_and_syncs() -> Result<()> {
    let app = test_app().await;
    let (_, vitamin_d) = seed_supplements(&app).await;
    let service = OfflineSupplements::new(&app.ctx);
    service.load().await?;

    app.ctx.connectivity.set_online(false);
    let log = service.queue_supplement_log(vitamin_d).await?;
    assert_eq!(app.ctx.connectivity.pending_count(), 1);

    let snapshot = service.load().await?;
    let data = snapshot.data.unwrap();
    assert_eq!(data.taken_count, 2);
    assert_eq!(data.pending_count, 0);

    app.ctx.connectivity.set_online(true);
    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 1);
    let logs = app.backend.rows("supplement_logs").await;
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().any(|row| row["id"] == log.id.to_string()));
    Ok(())
}

#[tokio::test]
async fn test_step_log_creates_then_updates() -> Result<()> {
    let app = test_app().await;
    let service = OfflineSteps::new(&app.ctx);

    let first = service.queue_step_log(3_000).await?;
    let second = service.queue_step_log(8_500).await?;
    assert_eq!(first.id, second.id);

    let queued = app.ctx.queue.pending(10).await?;
    assert_eq!(queued.len(), 2);
    assert_eq!(queued[0].entity, EntityType::StepLog);
    assert_eq!(queued[0].action, QueueAction::Create);
    assert_eq!(queued[1].action, QueueAction::Update);
    assert_eq!(queued[1].payload["steps"], 8_500);

    app.ctx.connectivity.set_online(false);
    let today = service.load().await?.data.unwrap();
    assert_eq!(today.steps, 8_500);
    assert_eq!(today.goal, 10_000);
    assert!(close(today.progress_percent, 85.0));

    app.ctx.connectivity.set_online(true);
    app.ctx.sync_engine().flush(None).await?;
    let rows = app.backend.rows("step_entries").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["steps"], 8_500);
    Ok(())
}

#[tokio::test]
async fn test_steps_reset_on_a_new_day() -> Result<()> {
    let app = test_app().await;
    app.backend
        .seed(
            "step_entries",
            vec![json!({ "id": Uuid::new_v4(), "user_id": app.user_id, "date": TODAY,
                         "steps": 12_000, "goal": 8_000 })],
        )
        .await;
    let service = OfflineSteps::new(&app.ctx);
    let today = service.load().await?.data.unwrap();
    assert!(close(today.progress_percent, 100.0));

    app.ctx.connectivity.set_online(false);
    app.clock.advance(Duration::days(1));
    let snapshot = service.load().await?;
    assert!(snapshot.is_stale);
    assert_eq!(snapshot.data.unwrap().steps, 0);

    let entry = service.queue_step_log(500).await?;
    assert_eq!(entry.date.to_string(), "2025-03-11");
    let queued = app.ctx.queue.pending(10).await?;
    assert_eq!(queued[0].action, QueueAction::Create);
    Ok(())
}

#[tokio::test]
async fn test_workout_today_and_rest_day() -> Result<()> {
    let app = test_app().await;
    let program_id = seed_program(&app).await;
    let service = OfflineWorkout::new(&app.ctx);

    let monday = service.load().await?.data.unwrap();
    assert_eq!(monday.program.as_ref().unwrap().id, program_id);
    let workout = monday.today_workout.unwrap();
    assert_eq!(workout.name, "Upper A");
    assert_eq!(workout.exercises.len(), 2);
    assert!(!monday.is_rest_day);

    app.ctx.connectivity.set_online(false);
    app.clock.advance(Duration::days(1));
    let tuesday = service.load().await?;
    assert!(tuesday.is_stale);
    let tuesday = tuesday.data.unwrap();
    assert!(tuesday.today_workout.is_none());
    assert!(tuesday.is_rest_day);
    Ok(())
}

#[tokio::test]
async fn test_offline_workout_session_and_sets() -> Result<()> {
    let app = test_app().await;
    let program_id = seed_program(&app).await;
    let service = OfflineWorkout::new(&app.ctx);
    service.load().await?;
    app.ctx.connectivity.set_online(false);

    let started = at("2025-03-10T09:00:00-05:00").with_timezone(&Utc);
    let session = service
        .queue_workout_session("Upper A", started, Some(started + Duration::minutes(55)))
        .await?;
    assert_eq!(session.program_id, Some(program_id));

    let set = service
        .queue_workout_set(NewWorkoutSet {
            session_id: session.id,
            exercise_name: "Bench Press".to_owned(),
            set_number: 1,
            reps: 8,
            weight_kg: Some(80.0),
        })
        .await?;
    assert_eq!(set.session_id, session.id);

    let invalid = service
        .queue_workout_set(NewWorkoutSet {
            session_id: session.id,
            exercise_name: "Bench Press".to_owned(),
            set_number: 0,
            reps: 8,
            weight_kg: None,
        })
        .await
        .unwrap_err();
    assert_eq!(invalid.code, ErrorCode::InvalidInput);

    let today = service.load().await?.data.unwrap();
    assert!(today.completed_today);
    assert_eq!(today.sessions.len(), 1);

    let entities: Vec<EntityType> = app
        .ctx
        .queue
        .pending(10)
        .await?
        .into_iter()
        .map(|item| item.entity)
        .collect();
    assert_eq!(entities, vec![EntityType::WorkoutSession, EntityType::WorkoutSet]);
    Ok(())
}

#[tokio::test]
async fn test_nutrition_filters_by_day_type_and_totals() -> Result<()> {
    let app = test_app().await;
    seed_nutrition(&app).await;
    let service = OfflineNutrition::new(&app.ctx);

    let today: NutritionToday = service.load().await?.data.unwrap();
    assert_eq!(today.day_type.as_deref(), Some("Training Day"));
    let names: Vec<&str> = today.meals.iter().map(|m| m.meal.name.as_str()).collect();
    assert_eq!(names, vec!["Oats", "Chicken & Rice"]);

    // 389 + 165 * 1.5 + 130 * 2
    assert!(close(today.planned_totals.calories, 896.5));
    assert!(close(today.consumed_totals.calories, 0.0));
    let split = today.macro_split;
    assert!(close(split.protein_percent + split.carbs_percent + split.fat_percent, 100.0));
    Ok(())
}

#[tokio::test]
async fn test_meal_log_updates_consumed_totals() -> Result<()> {
    let app = test_app().await;
    seed_nutrition(&app).await;
    let service = OfflineNutrition::new(&app.ctx);
    let loaded = service.load().await?.data.unwrap();
    let oats = loaded.meals.iter().find(|m| m.meal.name == "Oats").unwrap().meal.id;

    app.ctx.connectivity.set_online(false);
    let missing = service.queue_meal_log(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(missing.code, ErrorCode::ResourceNotFound);

    service.queue_meal_log(oats).await?;
    let today = service.load().await?.data.unwrap();
    assert!(close(today.consumed_totals.calories, 389.0));
    assert!(today.meals.iter().any(|m| m.meal.id == oats && m.logged));
    assert_eq!(app.ctx.queue.pending_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_sign_out_clears_cache_but_keeps_queue() -> Result<()> {
    let app = test_app().await;
    seed_supplements(&app).await;
    OfflineSupplements::new(&app.ctx).load().await?;
    OfflineSteps::new(&app.ctx).queue_step_log(1_200).await?;

    assert_eq!(app.ctx.sign_out().await?, Some(app.user_id));
    assert!(app.ctx.cache.keys().await?.is_empty());
    assert_eq!(app.ctx.queue.pending_count().await?, 1);

    let err = OfflineSupplements::new(&app.ctx).load().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);
    assert_eq!(app.ctx.sign_out().await?, None);
    Ok(())
}
