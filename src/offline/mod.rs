// ABOUTME: Offline-aware domain services composing backend fetch, cache fallback, and queued mutations
// ABOUTME: Shared snapshot type and the fetch-or-fallback routine every service follows
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Offline services
//!
//! Each service loads one day of data for the signed-in athlete:
//!
//! 1. Online: fetch from the backend, derive fields, write the cache, and
//!    return a snapshot with `is_from_cache = false`.
//! 2. Offline or failed fetch: read the cache, re-derive fields against the
//!    current local day, and return `is_from_cache = true`. `is_stale` is set
//!    when the cached data belongs to another day.
//! 3. No cache either: no data and a user-facing error message.
//!
//! Mutations are queued immediately and applied to the cached snapshot
//! without waiting for the backend.

/// Meals, totals, and meal logs
pub mod nutrition;
/// Step count and goal
pub mod steps;
/// Supplements and intake logs
pub mod supplements;
/// Active program and today's sessions
pub mod workout;

pub use nutrition::{MealWithTotals, NutritionToday, OfflineNutrition};
pub use steps::{OfflineSteps, StepsToday};
pub use supplements::{OfflineSupplements, SupplementStatus, SupplementsToday};
pub use workout::{NewWorkoutSet, OfflineWorkout, WorkoutToday};

use crate::cache::CacheKey;
use crate::context::AppContext;
use crate::errors::AppResult;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// Result of an offline-aware load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineSnapshot<T> {
    /// Loaded data, if any source had it
    pub data: Option<T>,
    /// Data came from the local cache
    pub is_from_cache: bool,
    /// Cached data belongs to an earlier day
    pub is_stale: bool,
    /// User-facing error when nothing could be loaded
    pub error: Option<String>,
}

impl<T> OfflineSnapshot<T> {
    /// Freshly fetched data
    #[must_use]
    pub const fn fresh(data: T) -> Self {
        Self {
            data: Some(data),
            is_from_cache: false,
            is_stale: false,
            error: None,
        }
    }

    /// Data read back from the cache
    #[must_use]
    pub const fn cached(data: T, is_stale: bool) -> Self {
        Self {
            data: Some(data),
            is_from_cache: true,
            is_stale,
            error: None,
        }
    }

    /// Nothing available
    #[must_use]
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            data: None,
            is_from_cache: false,
            is_stale: false,
            error: Some(error.into()),
        }
    }
}

/// One day of cached domain data
pub trait DailyData: Serialize + DeserializeOwned + Send + Sync {
    /// Local day the data was fetched for
    fn date(&self) -> NaiveDate;

    /// Recompute derived fields as of `today`
    fn refresh_for(&mut self, today: NaiveDate);
}

/// Fetch through `fetch` when online, otherwise fall back to the cache at `key`
pub(crate) async fn load_daily<T, F>(
    ctx: &AppContext,
    key: &CacheKey,
    what: &str,
    fetch: F,
) -> OfflineSnapshot<T>
where
    T: DailyData,
    F: Future<Output = AppResult<T>> + Send,
{
    let today = ctx.clock.today();
    let online = ctx.connectivity.is_online();

    if online {
        match fetch.await {
            Ok(mut data) => {
                data.refresh_for(today);
                ctx.cache.set_logged(key, &data).await;
                return OfflineSnapshot::fresh(data);
            }
            Err(e) => warn!(cache_key = %key, error = %e, "Fetch failed, falling back to cache"),
        }
    }

    if let Some(mut data) = ctx.cache.get::<T>(key).await {
        let is_stale = data.date() != today;
        data.refresh_for(today);
        debug!(cache_key = %key, is_stale, "Serving cached {what}");
        return OfflineSnapshot::cached(data, is_stale);
    }

    if online {
        OfflineSnapshot::unavailable(format!(
            "Unable to load {what}. Please check your connection and try again."
        ))
    } else {
        OfflineSnapshot::unavailable(format!(
            "You're offline and no {what} have been saved on this device yet."
        ))
    }
}

/// Apply `update` to the cached snapshot at `key`, if one exists
pub(crate) async fn updated_snapshot<T, U>(
    ctx: &AppContext,
    key: &CacheKey,
    update: U,
) -> AppResult<Option<serde_json::Value>>
where
    T: DailyData,
    U: FnOnce(&mut T),
{
    let Some(mut data) = ctx.cache.get::<T>(key).await else {
        return Ok(None);
    };
    update(&mut data);
    data.refresh_for(ctx.clock.today());
    Ok(Some(serde_json::to_value(&data)?))
}
