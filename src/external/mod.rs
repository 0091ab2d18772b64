// ABOUTME: External data API clients for food and exercise catalogs
// ABOUTME: Open Food Facts, USDA FoodData Central, HeyGainz, and a cached food search helper
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! External API Clients
//!
//! Food databases implement [`FoodSearchProvider`] and return [`FoodItem`]s
//! with per-100g macros so search results can be dropped straight into a
//! meal. [`search_foods_cached`] layers the shared cache over any provider.

pub mod heygainz;
pub mod open_food_facts;
pub mod usda_client;

pub use heygainz::{ExercisePage, HeyGainzClient};
pub use open_food_facts::OpenFoodFactsClient;
pub use usda_client::{UsdaCacheStats, UsdaClient, UsdaClientConfig};

use crate::cache::{Cache, CacheKey};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use coach_core::models::{FoodItem, FoodSource};
use tracing::debug;

/// A food database searchable by free text
#[async_trait]
pub trait FoodSearchProvider: Send + Sync {
    /// Origin stamped on returned items
    fn source(&self) -> FoodSource;

    /// Up to `limit` foods matching `query`
    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<FoodItem>>;
}

/// Search `provider`, reusing results cached under the normalized query
///
/// # Errors
///
/// Returns an error if the query is blank, or nothing is cached and the
/// provider fails
pub async fn search_foods_cached(
    cache: &Cache,
    provider: &dyn FoodSearchProvider,
    query: &str,
    limit: u32,
) -> AppResult<Vec<FoodItem>> {
    if query.trim().is_empty() {
        return Err(AppError::invalid_input("Search query cannot be empty"));
    }
    let key = CacheKey::food_search(provider.source(), query);
    // empty result lists are searched again
    if let Some(mut cached) = cache.get::<Vec<FoodItem>>(&key).await {
        if !cached.is_empty() {
            debug!(cache_key = %key, "Food search served from cache");
            cached.truncate(limit as usize);
            return Ok(cached);
        }
    }
    let foods = provider.search(query, limit).await?;
    cache.set_logged(&key, &foods).await;
    Ok(foods)
}
