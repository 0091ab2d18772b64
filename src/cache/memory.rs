// ABOUTME: In-memory cache implementation with LRU eviction
// ABOUTME: Used for session-scoped data such as exercise catalog pages, and in tests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{compile_pattern, CacheEntry, CacheProvider};
use crate::errors::AppResult;
use chrono::Utc;
use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory cache with LRU eviction
///
/// Entries live for the lifetime of the process; there is no TTL. The LRU
/// bound keeps a long session from growing without limit.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl InMemoryCache {
    /// Capacity used when zero entries are requested
    const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a cache holding at most `max_entries`
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(Self::DEFAULT_CACHE_CAPACITY);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl CacheProvider for InMemoryCache {
    async fn entry(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        // LruCache::get updates access order, so it needs the write lock
        Ok(self.store.write().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &Value) -> AppResult<()> {
        let entry = CacheEntry {
            key: key.to_owned(),
            value: value.clone(),
            cached_at: Utc::now(),
        };
        self.store.write().await.push(key.to_owned(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> AppResult<bool> {
        Ok(self.store.write().await.pop(key).is_some())
    }

    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        let glob_pattern = compile_pattern(pattern)?;
        let mut store = self.store.write().await;

        let keys_to_remove: Vec<String> = store
            .iter()
            .filter(|(k, _)| glob_pattern.matches(k))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &keys_to_remove {
            store.pop(key);
        }
        drop(store);

        Ok(keys_to_remove.len() as u64)
    }

    async fn keys(&self) -> AppResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .store
            .read()
            .await
            .iter()
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.store.write().await.clear();
        Ok(())
    }
}
