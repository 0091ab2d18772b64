// ABOUTME: HeyGainz exercise catalog client with page-level session caching
// ABOUTME: Pages are cached without a TTL and reused until the process exits or the cache is cleared
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::cache::{Cache, CacheKey};
use crate::config::environment::DEFAULT_HEYGAINZ_BASE_URL;
use crate::constants::cache::DEFAULT_CACHE_MAX_ENTRIES;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::api_client;
use coach_core::models::Exercise;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

const SERVICE: &str = "heygainz";

/// One page of the exercise catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExercisePage {
    /// Exercises on this page
    pub exercises: Vec<Exercise>,
    /// 1-based page number
    pub page: u32,
    /// Last available page
    pub last_page: u32,
}

impl ExercisePage {
    /// More pages follow this one
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.last_page
    }
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    data: Vec<RawExercise>,
    #[serde(default, alias = "currentPage")]
    current_page: Option<u32>,
    #[serde(default, alias = "lastPage", alias = "total_pages")]
    last_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawExercise {
    id: serde_json::Value,
    name: String,
    #[serde(default, alias = "muscles", alias = "target_muscles")]
    muscle_groups: Vec<String>,
    #[serde(default)]
    equipment: Option<String>,
    #[serde(default, alias = "type")]
    category: Option<String>,
}

impl From<RawExercise> for Exercise {
    fn from(raw: RawExercise) -> Self {
        let id = match raw.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            id,
            name: raw.name.trim().to_owned(),
            muscle_groups: raw.muscle_groups,
            equipment: raw.equipment.filter(|e| !e.trim().is_empty()),
            category: raw.category,
        }
    }
}

/// Exercise catalog client
#[derive(Clone)]
pub struct HeyGainzClient {
    client: reqwest::Client,
    base_url: String,
    cache: Cache,
}

impl Default for HeyGainzClient {
    fn default() -> Self {
        Self::new(DEFAULT_HEYGAINZ_BASE_URL)
    }
}

impl HeyGainzClient {
    /// Client with its own in-memory session cache
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_cache(
            api_client(),
            base_url,
            Cache::memory(DEFAULT_CACHE_MAX_ENTRIES),
        )
    }

    /// Client sharing `cache` with the rest of the session
    #[must_use]
    pub fn with_cache(client: reqwest::Client, base_url: impl Into<String>, cache: Cache) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            cache,
        }
    }

    /// One catalog page, from the cache when this session already fetched it
    ///
    /// # Errors
    ///
    /// Returns an error for page 0 or when the request fails
    #[instrument(skip(self), fields(service = SERVICE))]
    pub async fn fetch_page(&self, page: u32) -> AppResult<ExercisePage> {
        if page == 0 {
            return Err(AppError::invalid_input("Pages are numbered from 1"));
        }
        let key = CacheKey::ExerciseCatalogPage { page };
        if let Some(cached) = self.cache.get::<ExercisePage>(&key).await {
            debug!(page, "Exercise page served from session cache");
            return Ok(cached);
        }

        let response = self
            .client
            .get(format!("{}/exercises", self.base_url))
            .query(&[("page", page)])
            .send()
            .await
            .map_err(|e| AppError::external_unavailable(SERVICE, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::from_upstream_status(SERVICE, status.as_u16(), &body));
        }
        let body: PageResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE, format!("invalid JSON: {e}")))?;

        let page = body.current_page.unwrap_or(page);
        let exercises: Vec<Exercise> = body.data.into_iter().map(Exercise::from).collect();
        let result = ExercisePage {
            last_page: body.last_page.unwrap_or(page).max(page),
            page,
            exercises,
        };
        self.cache.set_logged(&key, &result).await;
        Ok(result)
    }

    /// Every exercise across pages, stopping after `max_pages`
    ///
    /// # Errors
    ///
    /// Returns an error if any page fails to load
    pub async fn fetch_catalog(&self, max_pages: u32) -> AppResult<Vec<Exercise>> {
        let mut exercises = Vec::new();
        let mut page = 1;
        while page <= max_pages {
            let current = self.fetch_page(page).await?;
            let more = current.has_more();
            exercises.extend(current.exercises);
            if !more {
                break;
            }
            page += 1;
        }
        info!(count = exercises.len(), pages = page.min(max_pages), "Exercise catalog loaded");
        Ok(exercises)
    }

    /// Forget every cached page
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written
    pub async fn clear_cache(&self) -> AppResult<u64> {
        self.cache
            .invalidate_pattern(&CacheKey::exercise_catalog_pattern())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_become_strings() {
        let raw: RawExercise = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": " Barbell Bench Press ",
            "muscles": ["chest", "triceps"],
            "equipment": "barbell"
        }))
        .unwrap();
        let exercise = Exercise::from(raw);
        assert_eq!(exercise.id, "42");
        assert_eq!(exercise.name, "Barbell Bench Press");
        assert_eq!(exercise.muscle_groups, vec!["chest", "triceps"]);
    }
}
