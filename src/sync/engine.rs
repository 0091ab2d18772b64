// ABOUTME: Replays queued mutations against the backend in sequence order
// ABOUTME: Retryable failures back off and halt the flush; fatal failures are dead-lettered
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::SyncQueue;
use crate::backend::{BackendClient, Query};
use crate::config::SyncConfig;
use crate::connectivity::Connectivity;
use crate::context::SessionStore;
use crate::dates::Clock;
use crate::errors::{AppError, AppResult};
use chrono::Duration;
use coach_core::constants::sync::DEFAULT_FLUSH_BATCH;
use coach_core::models::{QueueAction, QueueItem};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Outcome of one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    /// Items replayed and removed
    pub synced: usize,
    /// Items moved to the dead letter state
    pub failed: usize,
    /// Items left for a later flush because of backoff or a retryable failure
    pub deferred: usize,
    /// Pending items after the flush
    pub remaining: i64,
    /// The flush was skipped because the device is offline
    pub offline: bool,
}

enum Outcome {
    Synced,
    DeadLettered,
    Halted,
}

/// Ordered replay of the sync queue
#[derive(Clone)]
pub struct SyncEngine {
    queue: SyncQueue,
    backend: Arc<dyn BackendClient>,
    connectivity: Connectivity,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    session: Option<SessionStore>,
}

impl SyncEngine {
    /// Engine replaying `queue` against `backend`
    #[must_use]
    pub fn new(
        queue: SyncQueue,
        backend: Arc<dyn BackendClient>,
        connectivity: Connectivity,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
    ) -> Self {
        Self {
            queue,
            backend,
            connectivity,
            clock,
            config,
            session: None,
        }
    }

    /// Restrict every flush to the user signed in to `session`
    ///
    /// The backend only accepts a user's rows under that user's token, so a
    /// session-bound engine never replays items queued by someone else.
    #[must_use]
    pub fn with_session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Replay pending mutations, optionally only those of one user
    ///
    /// Items replay strictly by `seq`. A retryable failure or an item still
    /// in backoff stops the flush so no later mutation overtakes it; fatal
    /// failures are dead-lettered and the flush moves on.
    ///
    /// With a session attached, `None` means the signed-in user and other
    /// users' items stay queued for their own next session.
    ///
    /// # Errors
    ///
    /// Returns an error if the local queue cannot be read or written, or if
    /// a session-bound engine has nobody signed in or is asked for another
    /// user's items. Backend failures are recorded on the items instead.
    #[instrument(skip(self))]
    pub async fn flush(&self, user_id: Option<Uuid>) -> AppResult<FlushReport> {
        let user_id = self.scope(user_id).await?;
        let mut report = FlushReport::default();
        if !self.connectivity.is_online() {
            report.offline = true;
            report.remaining = self.connectivity.refresh_pending(&self.queue).await?;
            debug!(remaining = report.remaining, "Offline, flush skipped");
            return Ok(report);
        }

        let items = match user_id {
            Some(user_id) => self.queue.pending_for(user_id, DEFAULT_FLUSH_BATCH).await?,
            None => self.queue.pending(DEFAULT_FLUSH_BATCH).await?,
        };
        let now = self.clock.now_utc();

        for (index, item) in items.iter().enumerate() {
            if item.next_attempt_at.is_some_and(|at| at > now) {
                report.deferred = items.len() - index;
                debug!(id = %item.id, "Head of queue still backing off");
                break;
            }
            match self.process(item).await? {
                Outcome::Synced => report.synced += 1,
                Outcome::DeadLettered => report.failed += 1,
                Outcome::Halted => {
                    report.deferred = items.len() - index;
                    break;
                }
            }
        }

        report.remaining = self.connectivity.refresh_pending(&self.queue).await?;
        if report.synced > 0 || report.failed > 0 {
            info!(
                synced = report.synced,
                failed = report.failed,
                deferred = report.deferred,
                remaining = report.remaining,
                "Sync queue flushed"
            );
        }
        Ok(report)
    }

    async fn scope(&self, requested: Option<Uuid>) -> AppResult<Option<Uuid>> {
        let Some(session) = &self.session else {
            return Ok(requested);
        };
        let current = session.user_id().await.ok_or_else(AppError::auth_required)?;
        match requested {
            Some(other) if other != current => Err(AppError::auth_invalid(format!(
                "Mutations of user {other} cannot replay in the session of {current}"
            ))),
            _ => Ok(Some(current)),
        }
    }

    async fn process(&self, item: &QueueItem) -> AppResult<Outcome> {
        let error = match self.replay(item).await {
            Ok(()) => {
                self.queue.complete(item.id).await?;
                return Ok(Outcome::Synced);
            }
            Err(error) => error,
        };

        let attempts = item.attempts + 1;
        if !error.is_retryable() || attempts >= self.config.max_attempts {
            self.queue.mark_failed(item.id, &error.message).await?;
            return Ok(Outcome::DeadLettered);
        }

        let delay = Duration::from_std(self.config.backoff(attempts))
            .unwrap_or_else(|_| Duration::seconds(60));
        let next_attempt_at = self.clock.now_utc() + delay;
        warn!(
            id = %item.id,
            attempts,
            retry_in_secs = delay.num_seconds(),
            error = %error,
            "Replay failed, will retry"
        );
        self.queue
            .record_failure(item.id, &error.message, next_attempt_at)
            .await?;
        Ok(Outcome::Halted)
    }

    async fn replay(&self, item: &QueueItem) -> AppResult<()> {
        let table = item.entity.table();
        match item.action {
            QueueAction::Create => {
                if !item.payload.is_object() {
                    return Err(AppError::invalid_input("Create payload is not an object"));
                }
                self.backend
                    .upsert(table, item.payload.clone(), "id")
                    .await?;
            }
            QueueAction::Update => {
                let id = Self::target(item)?;
                let mut patch = item.payload.clone();
                if let Value::Object(fields) = &mut patch {
                    fields.remove("id");
                }
                self.backend
                    .update(&Query::table(table).eq("id", id), patch)
                    .await?;
            }
            QueueAction::Delete => {
                let id = Self::target(item)?;
                self.backend.delete(&Query::table(table).eq("id", id)).await?;
            }
        }
        debug!(id = %item.id, seq = item.seq, table, action = %item.action, "Mutation replayed");
        Ok(())
    }

    fn target(item: &QueueItem) -> AppResult<&str> {
        item.target_id()
            .ok_or_else(|| AppError::missing_field("id").with_resource_id(item.id.to_string()))
    }
}
