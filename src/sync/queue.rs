// ABOUTME: Persistent ordered log of offline mutations stored in the local SQLite store
// ABOUTME: Assigns idempotency keys and replay sequence, tracks retries, and dead-letters failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::cache::sqlite::SqliteCache;
use crate::cache::CacheKey;
use crate::database::LocalDatabase;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use coach_core::models::{NewQueueItem, QueueAction, QueueItem, QueueStatus};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

const ITEM_COLUMNS: &str = "seq, id, entity, action, user_id, payload, enqueued_at, attempts, \
                            last_error, next_attempt_at, status";

/// Ordered queue of pending mutations
#[derive(Clone, Debug)]
pub struct SyncQueue {
    pool: SqlitePool,
}

impl SyncQueue {
    /// Queue over an opened local store
    #[must_use]
    pub fn new(database: &LocalDatabase) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    /// Append a mutation and return the stored item
    ///
    /// The payload keeps only entity columns; the client-side update time is
    /// recorded on the item as `enqueued_at`. A create without a row `id`
    /// receives the idempotency key as its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a JSON object or the write fails
    pub async fn enqueue(&self, item: NewQueueItem) -> AppResult<QueueItem> {
        let prepared = Self::prepare(item)?;
        let seq = Self::insert(&self.pool, &prepared).await?;
        let stored = QueueItem { seq, ..prepared };
        debug!(id = %stored.id, seq, entity = %stored.entity, action = %stored.action, "Mutation queued");
        Ok(stored)
    }

    /// Append a mutation and overwrite the cached snapshot `key` in one transaction
    ///
    /// Either both writes land or neither does, so the optimistic snapshot
    /// never shows a change that is not queued for replay.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is invalid or either write fails
    pub async fn enqueue_with_cache(
        &self,
        item: NewQueueItem,
        key: &CacheKey,
        value: &Value,
    ) -> AppResult<QueueItem> {
        let prepared = Self::prepare(item)?;
        let mut tx = self.pool.begin().await?;
        let seq = Self::insert(&mut *tx, &prepared).await?;
        SqliteCache::write_entry(&mut *tx, &key.to_string(), value).await?;
        tx.commit().await?;

        let stored = QueueItem { seq, ..prepared };
        debug!(id = %stored.id, seq, cache_key = %key, "Mutation queued with cache snapshot");
        Ok(stored)
    }

    fn prepare(item: NewQueueItem) -> AppResult<QueueItem> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut payload = item.payload;
        let Value::Object(fields) = &mut payload else {
            return Err(AppError::invalid_input(format!(
                "Queued {} payload must be a JSON object",
                item.entity
            )));
        };

        match item.action {
            QueueAction::Create => {
                fields
                    .entry("id")
                    .or_insert_with(|| Value::String(id.to_string()));
            }
            QueueAction::Update | QueueAction::Delete => {
                if !fields.get("id").is_some_and(Value::is_string) {
                    return Err(AppError::missing_field("id"));
                }
            }
        }
        Ok(QueueItem {
            id,
            seq: 0,
            entity: item.entity,
            action: item.action,
            user_id: item.user_id,
            payload,
            enqueued_at: now,
            attempts: 0,
            last_error: None,
            next_attempt_at: None,
            status: QueueStatus::Pending,
        })
    }

    async fn insert<'e, E>(executor: E, item: &QueueItem) -> AppResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r"
            INSERT INTO sync_queue (id, entity, action, user_id, payload, enqueued_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            ",
        )
        .bind(item.id.to_string())
        .bind(item.entity.as_str())
        .bind(item.action.as_str())
        .bind(item.user_id.to_string())
        .bind(serde_json::to_string(&item.payload)?)
        .bind(item.enqueued_at)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Number of items still waiting for replay
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub async fn pending_count(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sync_queue WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Oldest pending items in replay order
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or a row is corrupt
    pub async fn pending(&self, limit: i64) -> AppResult<Vec<QueueItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM sync_queue WHERE status = 'pending' ORDER BY seq LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_item).collect()
    }

    /// Oldest pending items of one user in replay order
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or a row is corrupt
    pub async fn pending_for(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<QueueItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM sync_queue \
             WHERE status = 'pending' AND user_id = $1 ORDER BY seq LIMIT $2"
        ))
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_item).collect()
    }

    /// Dead-lettered items
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or a row is corrupt
    pub async fn failed(&self) -> AppResult<Vec<QueueItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM sync_queue WHERE status = 'failed' ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_item).collect()
    }

    /// Item by idempotency key, in any state
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the row is corrupt
    pub async fn get(&self, id: Uuid) -> AppResult<Option<QueueItem>> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM sync_queue WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_item).transpose()
    }

    /// Remove a replayed item
    ///
    /// Returns `false` when the item was already removed or is not pending,
    /// so a mutation is acknowledged at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written
    pub async fn complete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sync_queue WHERE id = $1 AND status = 'pending'")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected() == 1;
        if !removed {
            warn!(%id, "Queue item already completed");
        }
        Ok(removed)
    }

    /// Record a retryable replay failure and schedule the next attempt
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written
    pub async fn record_failure(
        &self,
        id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE sync_queue
            SET attempts = attempts + 1, last_error = $2, next_attempt_at = $3
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id.to_string())
        .bind(error)
        .bind(next_attempt_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Move an item to the dead letter state
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written
    pub async fn mark_failed(&self, id: Uuid, error: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE sync_queue
            SET status = 'failed', attempts = attempts + 1, last_error = $2, next_attempt_at = NULL
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id.to_string())
        .bind(error)
        .execute(&self.pool)
        .await?;
        let moved = result.rows_affected() == 1;
        if moved {
            warn!(%id, error, "Queue item moved to dead letter");
        }
        Ok(moved)
    }

    /// Put every dead-lettered item back in line with a fresh attempt budget
    ///
    /// Items keep their original `seq`, so they replay in their original order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written
    pub async fn retry_failed(&self) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE sync_queue
            SET status = 'pending', attempts = 0, next_attempt_at = NULL
            WHERE status = 'failed'
            ",
        )
        .execute(&self.pool)
        .await?;
        let requeued = result.rows_affected();
        if requeued > 0 {
            info!(requeued, "Dead-lettered items requeued");
        }
        Ok(requeued)
    }

    /// Drop every item of one user
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written
    pub async fn clear_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sync_queue WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn parse_uuid(row: &SqliteRow, column: &str) -> AppResult<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw)
        .map_err(|e| AppError::database(format!("Corrupt {column} in sync_queue: {e}")))
}

fn row_to_item(row: &SqliteRow) -> AppResult<QueueItem> {
    let payload: String = row.try_get("payload")?;
    let attempts: i64 = row.try_get("attempts")?;
    Ok(QueueItem {
        id: parse_uuid(row, "id")?,
        seq: row.try_get("seq")?,
        entity: row.try_get::<String, _>("entity")?.parse()?,
        action: row.try_get::<String, _>("action")?.parse()?,
        user_id: parse_uuid(row, "user_id")?,
        payload: serde_json::from_str(&payload)?,
        enqueued_at: row.try_get("enqueued_at")?,
        attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
        last_error: row.try_get("last_error")?,
        next_attempt_at: row.try_get("next_attempt_at")?,
        status: row.try_get::<String, _>("status")?.parse()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use coach_core::models::EntityType;
    use serde_json::json;

    async fn queue() -> SyncQueue {
        let db = LocalDatabase::new("sqlite::memory:").await.unwrap();
        SyncQueue::new(&db)
    }

    #[tokio::test]
    async fn test_create_receives_idempotency_key_as_row_id() {
        let queue = queue().await;
        let item = queue
            .enqueue(NewQueueItem::new(
                EntityType::SupplementLog,
                QueueAction::Create,
                Uuid::new_v4(),
                json!({"supplement_id": "s1"}),
            ))
            .await
            .unwrap();
        assert_eq!(item.target_id(), Some(item.id.to_string().as_str()));
        assert_eq!(
            item.payload,
            json!({"supplement_id": "s1", "id": item.id.to_string()})
        );
        assert_eq!(item.client_updated_at(), item.enqueued_at);
    }

    #[tokio::test]
    async fn test_update_without_row_id_is_rejected() {
        let queue = queue().await;
        let result = queue
            .enqueue(NewQueueItem::new(
                EntityType::StepLog,
                QueueAction::Update,
                Uuid::new_v4(),
                json!({"steps": 100}),
            ))
            .await;
        assert!(result.is_err());
        assert_eq!(queue.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sequence_is_monotonic() {
        let queue = queue().await;
        let user = Uuid::new_v4();
        let mut last = 0;
        for n in 0..5 {
            let item = queue
                .enqueue(NewQueueItem::new(
                    EntityType::StepLog,
                    QueueAction::Create,
                    user,
                    json!({"steps": n}),
                ))
                .await
                .unwrap();
            assert!(item.seq > last);
            last = item.seq;
        }
    }
}
