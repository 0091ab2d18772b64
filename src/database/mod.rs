// ABOUTME: Local SQLite store shared by the persistent cache and the sync queue
// ABOUTME: Opens the sqlx pool and runs the inline schema migrations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Local database
//!
//! The device-local store holds two tables: `cache_entries` (JSON blobs keyed
//! by semantic cache keys) and `sync_queue` (the ordered log of pending
//! mutations). Both live in one SQLite file so that a queue write and the
//! cache write that accompanies it can share a transaction.

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};

/// Handle to the local SQLite store
#[derive(Clone, Debug)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open (creating if needed) the store at `database_url` and run migrations
    ///
    /// `sqlite::memory:` is supported; the pool is then limited to a single
    /// connection so every query sees the same in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be opened, or a
    /// migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL '{database_url}': {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::database(format!(
                        "Cannot create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let in_memory = database_url.contains(":memory:");
        let mut pool_options =
            SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 4 });
        if in_memory {
            // closing the only connection would drop the database
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        info!(in_memory, "Local store ready");
        Ok(db)
    }

    /// Underlying connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run schema migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_cache().await?;
        self.migrate_sync_queue().await?;
        debug!("Local store migrations applied");
        Ok(())
    }

    async fn migrate_cache(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                cached_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn migrate_sync_queue(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sync_queue (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                entity TEXT NOT NULL,
                action TEXT NOT NULL,
                user_id TEXT NOT NULL,
                payload TEXT NOT NULL,
                enqueued_at TEXT NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                last_error TEXT,
                next_attempt_at TEXT,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'failed'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sync_queue_status_seq ON sync_queue(status, seq)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sync_queue_user ON sync_queue(user_id)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
