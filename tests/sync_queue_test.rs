// ABOUTME: Integration tests for the sync queue and its replay engine
// ABOUTME: Ordering, exactly-once removal, backoff, dead letters, idempotent creates, and persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod helpers;

use anyhow::Result;
use chrono::Duration;
use helpers::fixtures::{test_app, TestApp};
use pierre_coach::database::LocalDatabase;
use pierre_coach::errors::ErrorCode;
use pierre_coach::models::{EntityType, NewQueueItem, QueueAction, QueueStatus};
use pierre_coach::sync::SyncQueue;
use serde_json::{json, Value};
use uuid::Uuid;

fn meal_log(app: &TestApp, meal: &str) -> NewQueueItem {
    NewQueueItem::new(
        EntityType::MealLog,
        QueueAction::Create,
        app.user_id,
        json!({ "user_id": app.user_id, "meal_id": meal, "date": "2025-03-10" }),
    )
}

fn ids_in_log(log: &[String]) -> Vec<String> {
    log.iter()
        .filter_map(|line| line.rsplit(' ').next().map(str::to_owned))
        .collect()
}

#[tokio::test]
async fn test_enqueue_assigns_seq_and_idempotency_key() -> Result<()> {
    let app = test_app().await;

    let first = app.ctx.queue.enqueue(meal_log(&app, "breakfast")).await?;
    let second = app.ctx.queue.enqueue(meal_log(&app, "lunch")).await?;

    assert!(second.seq > first.seq);
    assert_eq!(first.payload["id"], first.id.to_string());
    assert!(first.payload.get("client_updated_at").is_none());
    assert_eq!(first.client_updated_at(), first.enqueued_at);
    assert_eq!(first.status, QueueStatus::Pending);
    assert_eq!(app.ctx.queue.pending_count().await?, 2);
    Ok(())
}

#[tokio::test]
async fn test_enqueue_rejects_invalid_payloads() -> Result<()> {
    let app = test_app().await;

    let not_object = NewQueueItem::new(
        EntityType::StepLog,
        QueueAction::Create,
        app.user_id,
        json!([1, 2, 3]),
    );
    let err = app.ctx.queue.enqueue(not_object).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let update_without_id = NewQueueItem::new(
        EntityType::StepLog,
        QueueAction::Update,
        app.user_id,
        json!({ "steps": 100 }),
    );
    let err = app.ctx.queue.enqueue(update_without_id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
    assert_eq!(app.ctx.queue.pending_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_flush_replays_in_order_exactly_once() -> Result<()> {
    let app = test_app().await;
    let mut queued = Vec::new();
    for meal in ["breakfast", "lunch", "dinner"] {
        queued.push(app.ctx.queue.enqueue(meal_log(&app, meal)).await?);
    }

    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.remaining, 0);
    assert_eq!(app.ctx.connectivity.pending_count(), 0);

    let again = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(again.synced, 0);

    let log = app.backend.write_log().await;
    assert_eq!(log.len(), 3);
    let expected: Vec<String> = queued.iter().map(|item| item.id.to_string()).collect();
    assert_eq!(ids_in_log(&log), expected);
    assert_eq!(app.backend.rows("meal_logs").await.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_complete_acknowledges_once() -> Result<()> {
    let app = test_app().await;
    let item = app.ctx.queue.enqueue(meal_log(&app, "snack")).await?;

    assert!(app.ctx.queue.complete(item.id).await?);
    assert!(!app.ctx.queue.complete(item.id).await?);
    assert!(app.ctx.queue.get(item.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_retryable_failure_stops_replay_and_backs_off() -> Result<()> {
    let app = test_app().await;
    let first = app.ctx.queue.enqueue(meal_log(&app, "breakfast")).await?;
    let second = app.ctx.queue.enqueue(meal_log(&app, "lunch")).await?;
    app.backend.fail_next_write(503).await;

    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 0);
    assert_eq!(report.deferred, 2);
    assert_eq!(report.remaining, 2);
    assert!(app.backend.write_log().await.is_empty());

    let stored = app.ctx.queue.get(first.id).await?.unwrap();
    assert_eq!(stored.attempts, 1);
    assert!(stored.last_error.is_some());
    assert!(stored.next_attempt_at.is_some());

    // Still backing off: nothing is attempted, the later item does not overtake
    let waiting = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(waiting.synced, 0);
    assert_eq!(waiting.deferred, 2);
    assert!(app.backend.write_log().await.is_empty());

    app.clock.advance(Duration::seconds(5));
    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 2);
    assert_eq!(
        ids_in_log(&app.backend.write_log().await),
        vec![first.id.to_string(), second.id.to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_fatal_failure_dead_letters_and_continues() -> Result<()> {
    let app = test_app().await;
    let rejected = app.ctx.queue.enqueue(meal_log(&app, "breakfast")).await?;
    app.ctx.queue.enqueue(meal_log(&app, "lunch")).await?;
    app.backend.fail_next_write(422).await;

    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.failed, 1);
    assert_eq!(report.synced, 1);
    assert_eq!(report.remaining, 0);

    let failed = app.ctx.queue.failed().await?;
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, rejected.id);
    assert_eq!(failed[0].status, QueueStatus::Failed);
    assert!(failed[0].last_error.as_deref().unwrap().contains("422"));

    assert_eq!(app.ctx.queue.retry_failed().await?, 1);
    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 1);
    assert!(app.ctx.queue.failed().await?.is_empty());
    assert_eq!(app.backend.rows("meal_logs").await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_attempts_exhausted_dead_letters() -> Result<()> {
    let app = test_app().await;
    let item = app.ctx.queue.enqueue(meal_log(&app, "dinner")).await?;
    app.backend.set_available(false);

    for _ in 0..2 {
        let report = app.ctx.sync_engine().flush(None).await?;
        assert_eq!(report.failed, 0);
        assert_eq!(report.deferred, 1);
        app.clock.advance(Duration::seconds(30));
    }
    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.failed, 1);

    let stored = app.ctx.queue.get(item.id).await?.unwrap();
    assert_eq!(stored.status, QueueStatus::Failed);
    assert_eq!(stored.attempts, 3);
    Ok(())
}

#[tokio::test]
async fn test_replaying_a_create_twice_yields_one_row() -> Result<()> {
    let app = test_app().await;
    let row_id = Uuid::new_v4();
    let payload = json!({ "id": row_id, "user_id": app.user_id, "steps": 4200, "date": "2025-03-10" });

    for _ in 0..2 {
        app.ctx
            .queue
            .enqueue(NewQueueItem::new(
                EntityType::StepLog,
                QueueAction::Create,
                app.user_id,
                payload.clone(),
            ))
            .await?;
    }

    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 2);
    let rows = app.backend.rows("step_entries").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], row_id.to_string());
    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_target_payload_id() -> Result<()> {
    let app = test_app().await;
    let row_id = Uuid::new_v4().to_string();
    let queue = &app.ctx.queue;
    let user = app.user_id;

    queue
        .enqueue(NewQueueItem::new(
            EntityType::StepLog,
            QueueAction::Create,
            user,
            json!({ "id": row_id, "user_id": user, "steps": 1000, "date": "2025-03-10" }),
        ))
        .await?;
    queue
        .enqueue(NewQueueItem::new(
            EntityType::StepLog,
            QueueAction::Update,
            user,
            json!({ "id": row_id, "steps": 2500 }),
        ))
        .await?;
    app.ctx.sync_engine().flush(None).await?;

    let rows = app.backend.rows("step_entries").await;
    assert_eq!(rows[0]["steps"], 2500);
    assert_eq!(rows[0]["id"], Value::String(row_id.clone()));

    queue
        .enqueue(NewQueueItem::new(
            EntityType::StepLog,
            QueueAction::Delete,
            user,
            json!({ "id": row_id }),
        ))
        .await?;
    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 1);
    assert!(app.backend.rows("step_entries").await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_offline_flush_is_skipped() -> Result<()> {
    let app = test_app().await;
    app.ctx.queue.enqueue(meal_log(&app, "lunch")).await?;
    app.ctx.connectivity.set_online(false);

    let report = app.ctx.sync_engine().flush(None).await?;
    assert!(report.offline);
    assert_eq!(report.remaining, 1);
    assert_eq!(app.ctx.connectivity.pending_count(), 1);
    assert!(app.backend.write_log().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_flush_for_one_user_leaves_others() -> Result<()> {
    let app = test_app().await;
    app.ctx.queue.enqueue(meal_log(&app, "lunch")).await?;
    let other = Uuid::new_v4();
    app.ctx
        .queue
        .enqueue(NewQueueItem::new(
            EntityType::MealLog,
            QueueAction::Create,
            other,
            json!({ "user_id": other, "meal_id": "dinner" }),
        ))
        .await?;

    let report = app.ctx.sync_engine().flush(Some(app.user_id)).await?;
    assert_eq!(report.synced, 1);
    assert_eq!(report.remaining, 1);
    assert_eq!(app.ctx.queue.pending_for(other, 10).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_flush_after_user_switch_replays_only_the_session_user() -> Result<()> {
    let app = test_app().await;
    let alice = app.user_id;
    app.ctx.connectivity.set_online(false);
    app.ctx.queue.enqueue(meal_log(&app, "breakfast")).await?;
    app.ctx.sign_out().await?;

    let bob = Uuid::new_v4();
    app.ctx.sign_in(bob, "bob-access-token").await;
    app.ctx.connectivity.set_online(true);
    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.remaining, 1);
    assert!(app.backend.write_log().await.is_empty());
    assert!(app.ctx.queue.failed().await?.is_empty());

    let err = app.ctx.sync_engine().flush(Some(alice)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);

    app.ctx.sign_out().await?;
    let err = app.ctx.sync_engine().flush(None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);

    app.ctx.sign_in(alice, "alice-access-token").await;
    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 1);
    assert_eq!(report.remaining, 0);
    let rows = app.backend.rows(EntityType::MealLog.table()).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"], alice.to_string());
    Ok(())
}

#[tokio::test]
async fn test_replayed_rows_carry_only_entity_columns() -> Result<()> {
    let app = test_app().await;
    let created = app.ctx.queue.enqueue(meal_log(&app, "lunch")).await?;

    let step_id = Uuid::new_v4().to_string();
    let table = EntityType::StepLog.table();
    app.backend
        .seed(
            table,
            vec![json!({ "id": step_id, "user_id": app.user_id, "date": "2025-03-10", "steps": 100 })],
        )
        .await;
    app.ctx
        .queue
        .enqueue(NewQueueItem::new(
            EntityType::StepLog,
            QueueAction::Update,
            app.user_id,
            json!({ "id": step_id, "steps": 2_500 }),
        ))
        .await?;

    let report = app.ctx.sync_engine().flush(None).await?;
    assert_eq!(report.synced, 2);

    let meals = app.backend.rows(EntityType::MealLog.table()).await;
    assert_eq!(
        meals,
        vec![json!({
            "id": created.id.to_string(),
            "user_id": app.user_id,
            "meal_id": "lunch",
            "date": "2025-03-10"
        })]
    );
    let steps = app.backend.rows(table).await;
    assert_eq!(
        steps,
        vec![json!({ "id": step_id, "user_id": app.user_id, "date": "2025-03-10", "steps": 2_500 })]
    );
    Ok(())
}

#[tokio::test]
async fn test_queue_survives_reopening_the_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite:{}", dir.path().join("coach.db").display());
    let user = Uuid::new_v4();

    {
        let database = LocalDatabase::new(&url).await?;
        SyncQueue::new(&database)
            .enqueue(NewQueueItem::new(
                EntityType::SupplementLog,
                QueueAction::Create,
                user,
                json!({ "supplement_id": Uuid::new_v4() }),
            ))
            .await?;
        database.pool().close().await;
    }

    let database = LocalDatabase::new(&url).await?;
    let queue = SyncQueue::new(&database);
    assert_eq!(queue.pending_count().await?, 1);
    assert_eq!(queue.pending(10).await?[0].entity, EntityType::SupplementLog);
    assert_eq!(queue.clear_user(user).await?, 1);
    Ok(())
}
