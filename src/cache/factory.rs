// ABOUTME: Cache factory unifying the SQLite and in-memory backends
// ABOUTME: Adds typed get/set on top of the raw JSON provider operations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::memory::InMemoryCache;
use super::sqlite::SqliteCache;
use super::{CacheEntry, CacheKey, CacheProvider};
use crate::database::LocalDatabase;
use crate::errors::AppResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// Unified cache interface
#[derive(Clone)]
pub enum Cache {
    /// Persistent store, the default for user data
    Sqlite(SqliteCache),
    /// Process-lifetime store
    Memory(InMemoryCache),
}

impl Cache {
    /// Persistent cache over the local store
    #[must_use]
    pub fn sqlite(database: &LocalDatabase) -> Self {
        Self::Sqlite(SqliteCache::new(database))
    }

    /// In-memory cache holding at most `max_entries`
    #[must_use]
    pub fn memory(max_entries: usize) -> Self {
        tracing::info!("Initializing in-memory cache (max entries: {max_entries})");
        Self::Memory(InMemoryCache::new(max_entries))
    }

    fn provider(&self) -> &dyn CacheProvider {
        match self {
            Self::Sqlite(cache) => cache,
            Self::Memory(cache) => cache,
        }
    }

    /// Cached value for `key`, or `None`
    ///
    /// Read and decode failures are logged and reported as a miss; a broken
    /// cache entry must never take the caller down.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        let entry = match self.provider().entry(&key).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Cache read failed");
                return None;
            }
        };
        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Cached value has unexpected shape");
                None
            }
        }
    }

    /// Raw entry with its `cached_at` timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    pub async fn entry(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        self.provider().entry(key).await
    }

    /// Serialize and store `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub async fn set<T: Serialize + Sync>(&self, key: &CacheKey, value: &T) -> AppResult<()> {
        let value = serde_json::to_value(value)?;
        self.provider().put(&key.to_string(), &value).await
    }

    /// Store `value`, logging instead of returning a failure
    pub async fn set_logged<T: Serialize + Sync>(&self, key: &CacheKey, value: &T) {
        if let Err(e) = self.set(key, value).await {
            warn!(cache_key = %key, error = %e, "Cache write failed");
        }
    }

    /// Remove a single entry
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<bool> {
        self.provider().invalidate(&key.to_string()).await
    }

    /// Remove all entries matching a glob pattern
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid or the backend fails
    pub async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        self.provider().invalidate_pattern(pattern).await
    }

    /// Remove every entry of one user
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written
    pub async fn clear_user(&self, user_id: Uuid) -> AppResult<u64> {
        let removed = self
            .invalidate_pattern(&CacheKey::user_pattern(user_id))
            .await?;
        debug!(%user_id, removed, "Cleared user cache");
        Ok(removed)
    }

    /// All stored keys
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    pub async fn keys(&self) -> AppResult<Vec<String>> {
        self.provider().keys().await
    }

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if the health check fails
    pub async fn health_check(&self) -> AppResult<()> {
        self.provider().health_check().await
    }

    /// Clear all entries
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails
    pub async fn clear_all(&self) -> AppResult<()> {
        self.provider().clear_all().await
    }
}
