// ABOUTME: Persistent cache backed by the local SQLite store
// ABOUTME: Survives restarts so offline reads can fall back to the last fetched data
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{compile_pattern, CacheEntry, CacheProvider};
use crate::database::LocalDatabase;
use crate::errors::AppResult;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

/// SQLite-backed cache over the `cache_entries` table
#[derive(Clone, Debug)]
pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    /// Cache over an opened local store
    #[must_use]
    pub fn new(database: &LocalDatabase) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    /// Upsert an entry through any executor, so callers can include it in a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or the write fails
    pub async fn write_entry<'e, E>(executor: E, key: &str, value: &Value) -> AppResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let serialized = serde_json::to_string(value)?;
        sqlx::query(
            r"
            INSERT INTO cache_entries (key, value, cached_at)
            VALUES ($1, $2, $3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, cached_at = excluded.cached_at
            ",
        )
        .bind(key)
        .bind(serialized)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    fn row_to_entry(row: &SqliteRow) -> AppResult<CacheEntry> {
        let raw: String = row.try_get("value")?;
        Ok(CacheEntry {
            key: row.try_get("key")?,
            value: serde_json::from_str(&raw)?,
            cached_at: row.try_get::<DateTime<Utc>, _>("cached_at")?,
        })
    }
}

#[async_trait::async_trait]
impl CacheProvider for SqliteCache {
    async fn entry(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        let row = sqlx::query("SELECT key, value, cached_at FROM cache_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn put(&self, key: &str, value: &Value) -> AppResult<()> {
        Self::write_entry(&self.pool, key, value).await
    }

    async fn invalidate(&self, key: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        let glob_pattern = compile_pattern(pattern)?;
        let matching: Vec<String> = self
            .keys()
            .await?
            .into_iter()
            .filter(|key| glob_pattern.matches(key))
            .collect();

        let mut tx = self.pool.begin().await?;
        let mut removed = 0;
        for key in &matching {
            removed += sqlx::query("DELETE FROM cache_entries WHERE key = $1")
                .bind(key)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(removed)
    }

    async fn keys(&self) -> AppResult<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM cache_entries ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("key").map_err(Into::into))
            .collect()
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn clear_all(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM cache_entries")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
