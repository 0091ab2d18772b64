// ABOUTME: Local cache abstraction keyed by semantic, user-scoped cache keys
// ABOUTME: Pluggable backends (SQLite for persistence, in-memory LRU for the session) behind one trait
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Cache factory unifying the backends
pub mod factory;
/// In-memory LRU cache
pub mod memory;
/// Persistent SQLite cache
pub mod sqlite;

pub use factory::Cache;

use crate::constants::cache::{EXERCISE_CATALOG_PREFIX, FOOD_SEARCH_PREFIX, USER_KEY_PREFIX};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use coach_core::models::FoodSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Cache provider trait for pluggable backend implementations
///
/// Entries carry no TTL. Callers decide staleness from the `date` embedded
/// in the cached value or from `cached_at`.
///
/// # Examples
///
/// ```rust,no_run
/// use pierre_coach::cache::{CacheKey, CacheProvider};
/// use pierre_coach::cache::memory::InMemoryCache;
/// use serde_json::json;
/// use uuid::Uuid;
/// # async fn example() -> Result<(), pierre_coach::errors::AppError> {
///
/// let cache = InMemoryCache::new(100);
/// let key = CacheKey::TodaySteps { user_id: Uuid::new_v4() };
///
/// cache.put(&key.to_string(), &json!({ "date": "2025-03-10", "steps": 4200 })).await?;
/// if let Some(entry) = cache.entry(&key.to_string()).await? {
///     println!("cached at {}", entry.cached_at);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait CacheProvider: Send + Sync {
    /// Raw entry stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn entry(&self, key: &str) -> AppResult<Option<CacheEntry>>;

    /// Store `value` under `key`, replacing any previous entry
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written
    async fn put(&self, key: &str, value: &Value) -> AppResult<()>;

    /// Remove a single entry, reporting whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written
    async fn invalidate(&self, key: &str) -> AppResult<bool>;

    /// Remove all entries whose key matches a glob pattern (e.g. `user:*:steps:*`)
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid or the backend fails
    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64>;

    /// All stored keys, sorted
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn keys(&self) -> AppResult<Vec<String>>;

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if the health check fails
    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }

    /// Clear all entries
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}

/// Stored cache value with its freshness timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    /// Cache key
    pub key: String,
    /// Cached JSON value
    pub value: Value,
    /// When the value was written
    pub cached_at: DateTime<Utc>,
}

/// Semantic cache keys, scoped by user and data domain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Active workout program with its weekly schedule
    WorkoutProgram {
        /// Athlete
        user_id: Uuid,
    },
    /// Supplements with today's intake logs
    TodaySupplements {
        /// Athlete
        user_id: Uuid,
    },
    /// Today's meals, totals, and meal logs
    TodayNutrition {
        /// Athlete
        user_id: Uuid,
    },
    /// Today's step count and goal
    TodaySteps {
        /// Athlete
        user_id: Uuid,
    },
    /// One page of the exercise catalog
    ExerciseCatalogPage {
        /// 1-based page number
        page: u32,
    },
    /// Food search results of one data source
    FoodSearch {
        /// Data source
        source: FoodSource,
        /// Search term, lowercased and trimmed
        query: String,
    },
}

impl CacheKey {
    /// Food search key with a normalized query
    #[must_use]
    pub fn food_search(source: FoodSource, query: &str) -> Self {
        Self::FoodSearch {
            source,
            query: query.trim().to_lowercase(),
        }
    }

    /// Pattern matching every entry of one user
    #[must_use]
    pub fn user_pattern(user_id: Uuid) -> String {
        format!("{USER_KEY_PREFIX}{user_id}:*")
    }

    /// Pattern matching every exercise catalog page
    #[must_use]
    pub fn exercise_catalog_pattern() -> String {
        format!("{EXERCISE_CATALOG_PREFIX}:*")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkoutProgram { user_id } => {
                write!(f, "{USER_KEY_PREFIX}{user_id}:workout:program")
            }
            Self::TodaySupplements { user_id } => {
                write!(f, "{USER_KEY_PREFIX}{user_id}:supplements:today")
            }
            Self::TodayNutrition { user_id } => {
                write!(f, "{USER_KEY_PREFIX}{user_id}:nutrition:today")
            }
            Self::TodaySteps { user_id } => write!(f, "{USER_KEY_PREFIX}{user_id}:steps:today"),
            Self::ExerciseCatalogPage { page } => {
                write!(f, "{EXERCISE_CATALOG_PREFIX}:page:{page}")
            }
            Self::FoodSearch { source, query } => {
                write!(f, "{FOOD_SEARCH_PREFIX}:{}:{query}", source.as_str())
            }
        }
    }
}

/// Compile a glob pattern used for key invalidation
pub fn compile_pattern(pattern: &str) -> AppResult<glob::Pattern> {
    glob::Pattern::new(pattern)
        .map_err(|e| AppError::invalid_input(format!("Invalid glob pattern '{pattern}': {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rendering() {
        let user_id = Uuid::nil();
        assert_eq!(
            CacheKey::TodaySteps { user_id }.to_string(),
            "user:00000000-0000-0000-0000-000000000000:steps:today"
        );
        assert_eq!(
            CacheKey::ExerciseCatalogPage { page: 3 }.to_string(),
            "exercises:catalog:page:3"
        );
        assert_eq!(
            CacheKey::food_search(FoodSource::OpenFoodFacts, "  Greek Yogurt ").to_string(),
            "food:search:open_food_facts:greek yogurt"
        );
    }

    #[test]
    fn test_user_pattern_matches_only_that_user() {
        let user_id = Uuid::new_v4();
        let pattern = compile_pattern(&CacheKey::user_pattern(user_id)).unwrap();
        assert!(pattern.matches(&CacheKey::WorkoutProgram { user_id }.to_string()));
        assert!(!pattern.matches(
            &CacheKey::WorkoutProgram {
                user_id: Uuid::new_v4()
            }
            .to_string()
        ));
        assert!(!pattern.matches(&CacheKey::ExerciseCatalogPage { page: 1 }.to_string()));
    }
}
