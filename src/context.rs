// ABOUTME: Explicit session and dependency context shared by the offline services
// ABOUTME: Bundles backend, cache, queue, connectivity, clock, and the signed-in session
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Application context
//!
//! Services receive an [`AppContext`] by reference instead of reaching for
//! globals. The session has an explicit lifecycle: [`AppContext::sign_in`]
//! installs the user and forwards the access token to the backend;
//! [`AppContext::sign_out`] drops the token and the user's cached data.

use crate::backend::BackendClient;
use crate::cache::{Cache, CacheKey};
use crate::config::SyncConfig;
use crate::connectivity::Connectivity;
use crate::database::LocalDatabase;
use crate::dates::{Clock, SystemClock};
use crate::errors::{AppError, AppResult};
use crate::sync::{SyncEngine, SyncQueue};
use chrono::{DateTime, Utc};
use coach_core::models::{NewQueueItem, QueueItem};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Authenticated user
    pub user_id: Uuid,
    /// Backend access token
    pub access_token: String,
    /// When the session started
    pub signed_in_at: DateTime<Utc>,
}

/// Holder of the current session; clones share state
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session, replacing any previous one
    pub async fn set(&self, session: Session) {
        *self.current.write().await = Some(session);
    }

    /// Remove and return the current session
    pub async fn take(&self) -> Option<Session> {
        self.current.write().await.take()
    }

    /// Copy of the current session
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Id of the signed-in user
    pub async fn user_id(&self) -> Option<Uuid> {
        self.current.read().await.as_ref().map(|s| s.user_id)
    }
}

/// Everything a service needs, passed by reference
#[derive(Clone)]
pub struct AppContext {
    /// Hosted backend
    pub backend: Arc<dyn BackendClient>,
    /// Local cache
    pub cache: Cache,
    /// Pending mutation queue
    pub queue: SyncQueue,
    /// Online flag and pending count
    pub connectivity: Connectivity,
    /// Signed-in session
    pub session: SessionStore,
    /// Local time source
    pub clock: Arc<dyn Clock>,
    /// Replay policy
    pub sync_config: SyncConfig,
}

impl AppContext {
    /// Context over the local store with the persistent cache and system clock
    #[must_use]
    pub fn new(backend: Arc<dyn BackendClient>, database: &LocalDatabase) -> Self {
        Self::builder(backend, database).build()
    }

    /// Builder starting from the defaults of [`AppContext::new`]
    #[must_use]
    pub fn builder(backend: Arc<dyn BackendClient>, database: &LocalDatabase) -> AppContextBuilder {
        AppContextBuilder {
            backend,
            cache: Cache::sqlite(database),
            queue: SyncQueue::new(database),
            connectivity: Connectivity::default(),
            clock: Arc::new(SystemClock),
            sync_config: SyncConfig::default(),
        }
    }

    /// Start a session for `user_id`
    pub async fn sign_in(&self, user_id: Uuid, access_token: impl Into<String>) {
        let access_token = access_token.into();
        self.backend
            .set_access_token(Some(access_token.clone()))
            .await;
        self.session
            .set(Session {
                user_id,
                access_token,
                signed_in_at: self.clock.now_utc(),
            })
            .await;
        if let Err(e) = self.connectivity.refresh_pending(&self.queue).await {
            warn!(error = %e, "Could not refresh pending count at sign-in");
        }
        info!(%user_id, "Signed in");
    }

    /// End the session and drop the user's cached data
    ///
    /// Queued mutations are kept so they still replay after the user's next
    /// sign-in.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be cleared
    pub async fn sign_out(&self) -> AppResult<Option<Uuid>> {
        let Some(session) = self.session.take().await else {
            return Ok(None);
        };
        self.backend.set_access_token(None).await;
        let removed = self.cache.clear_user(session.user_id).await?;
        info!(user_id = %session.user_id, removed, "Signed out");
        Ok(Some(session.user_id))
    }

    /// Id of the signed-in user
    ///
    /// # Errors
    ///
    /// Returns an authentication error when nobody is signed in
    pub async fn require_user(&self) -> AppResult<Uuid> {
        self.session.user_id().await.ok_or_else(AppError::auth_required)
    }

    /// Queue a mutation together with the optimistic snapshot of `key`
    ///
    /// With the persistent cache both writes share one transaction. The
    /// pending count is refreshed afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation cannot be queued
    pub async fn enqueue_optimistic(
        &self,
        item: NewQueueItem,
        key: &CacheKey,
        snapshot: Option<&Value>,
    ) -> AppResult<QueueItem> {
        let stored = match (snapshot, &self.cache) {
            (Some(value), Cache::Sqlite(_)) => {
                self.queue.enqueue_with_cache(item, key, value).await?
            }
            (Some(value), Cache::Memory(_)) => {
                let stored = self.queue.enqueue(item).await?;
                self.cache.set_logged(key, value).await;
                stored
            }
            (None, _) => self.queue.enqueue(item).await?,
        };
        if let Err(e) = self.connectivity.refresh_pending(&self.queue).await {
            warn!(error = %e, "Could not refresh pending count");
        }
        Ok(stored)
    }

    /// Replay engine over this context's queue and backend
    ///
    /// The engine is bound to the session: it replays only the signed-in
    /// user's items, and items left by a previous user wait for that user.
    #[must_use]
    pub fn sync_engine(&self) -> SyncEngine {
        SyncEngine::new(
            self.queue.clone(),
            Arc::clone(&self.backend),
            self.connectivity.clone(),
            Arc::clone(&self.clock),
            self.sync_config,
        )
        .with_session(self.session.clone())
    }
}

/// Builder for [`AppContext`]
pub struct AppContextBuilder {
    backend: Arc<dyn BackendClient>,
    cache: Cache,
    queue: SyncQueue,
    connectivity: Connectivity,
    clock: Arc<dyn Clock>,
    sync_config: SyncConfig,
}

impl AppContextBuilder {
    /// Use a different cache
    #[must_use]
    pub fn cache(mut self, cache: Cache) -> Self {
        self.cache = cache;
        self
    }

    /// Share an existing connectivity signal
    #[must_use]
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Use a different clock
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a different replay policy
    #[must_use]
    pub fn sync_config(mut self, sync_config: SyncConfig) -> Self {
        self.sync_config = sync_config;
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> AppContext {
        AppContext {
            backend: self.backend,
            cache: self.cache,
            queue: self.queue,
            connectivity: self.connectivity,
            session: SessionStore::new(),
            clock: self.clock,
            sync_config: self.sync_config,
        }
    }
}
