// ABOUTME: Sync queue commands for coach-cli
// ABOUTME: Lists pending and dead-lettered mutations, flushes the queue, and requeues failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_coach::{
    backend::RestBackend,
    config::ServerConfig,
    context::AppContext,
    database::LocalDatabase,
    errors::AppResult,
    sync::SyncQueue,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::helpers::display::{display_flush_report, display_queue_items};

type Result<T> = AppResult<T>;

/// Print pending mutations in replay order
pub async fn pending(database: &LocalDatabase, limit: i64) -> Result<()> {
    let queue = SyncQueue::new(database);
    let total = queue.pending_count().await?;
    let items = queue.pending(limit).await?;
    println!("{total} pending mutation(s)");
    display_queue_items(&items);
    Ok(())
}

/// Replay one user's queued mutations against the configured backend
pub async fn flush(
    database: &LocalDatabase,
    config: &ServerConfig,
    user: Uuid,
    token: String,
) -> Result<()> {
    let backend = RestBackend::from_config(&config.backend)?;
    let ctx = AppContext::builder(Arc::new(backend), database)
        .sync_config(config.sync)
        .build();
    ctx.sign_in(user, token).await;
    info!(%user, "Flushing sync queue");
    let report = ctx.sync_engine().flush(None).await?;
    display_flush_report(&report);
    Ok(())
}

/// Print dead-lettered mutations
pub async fn failed(database: &LocalDatabase) -> Result<()> {
    let items = SyncQueue::new(database).failed().await?;
    println!("{} failed mutation(s)", items.len());
    display_queue_items(&items);
    Ok(())
}

/// Move dead letters back to pending
pub async fn retry(database: &LocalDatabase) -> Result<()> {
    let moved = SyncQueue::new(database).retry_failed().await?;
    println!("Requeued {moved} mutation(s)");
    Ok(())
}
