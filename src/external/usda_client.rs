// ABOUTME: USDA FoodData Central API client for nutritional data retrieval
// ABOUTME: Maps search and detail responses to food items with caching and rate limiting
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! USDA `FoodData` Central API Client
//!
//! Searches and detail lookups are mapped straight into [`FoodItem`] with
//! per-100g macros. Responses are kept in bounded in-process caches with a
//! TTL, and outgoing requests are limited to a rolling per-minute budget.
//!
//! # API Reference
//! USDA `FoodData` Central API: <https://fdc.nal.usda.gov/api-guide.html>

use super::FoodSearchProvider;
use crate::config::DataApiConfig;
use crate::config::environment::DEFAULT_USDA_BASE_URL;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::api_client;
use async_trait::async_trait;
use coach_core::models::{FoodItem, FoodSource};
use lru::LruCache;
use serde::Deserialize;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const SERVICE: &str = "usda";

/// Energy (kcal)
const NUTRIENT_ENERGY_KCAL: u32 = 1008;
/// Energy, Atwater general factors; Foundation foods report this instead of 1008
const NUTRIENT_ENERGY_ATWATER_GENERAL: u32 = 2047;
/// Energy, Atwater specific factors
const NUTRIENT_ENERGY_ATWATER_SPECIFIC: u32 = 2048;
const NUTRIENT_PROTEIN: u32 = 1003;
const NUTRIENT_FAT: u32 = 1004;
const NUTRIENT_CARBS: u32 = 1005;
const NUTRIENT_FIBER: u32 = 1079;

/// Entries kept in each in-process cache
const CACHE_CAPACITY: usize = 512;

/// USDA API client configuration
#[derive(Debug, Clone)]
pub struct UsdaClientConfig {
    /// USDA API key (free from <https://fdc.nal.usda.gov/api-key-signup.html>)
    pub api_key: String,
    /// Base URL for USDA API
    pub base_url: String,
    /// Cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Requests allowed per rolling minute
    pub rate_limit_per_minute: u32,
}

impl Default for UsdaClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_USDA_BASE_URL.to_owned(),
            cache_ttl_secs: 86_400,
            rate_limit_per_minute: 30,
        }
    }
}

impl UsdaClientConfig {
    /// Build from the data API settings
    ///
    /// # Errors
    ///
    /// Returns a config error when `USDA_API_KEY` is not set
    pub fn from_config(config: &DataApiConfig) -> AppResult<Self> {
        let api_key = config
            .usda_api_key
            .clone()
            .ok_or_else(|| AppError::config("USDA_API_KEY is not set"))?;
        Ok(Self {
            api_key,
            base_url: config.usda_base_url.clone(),
            ..Self::default()
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    fdc_id: u64,
    description: String,
    brand_owner: Option<String>,
    brand_name: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<SearchNutrient>,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNutrient {
    nutrient_id: u32,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodDetailsResponse {
    fdc_id: u64,
    description: String,
    brand_owner: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<DetailNutrient>,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailNutrient {
    nutrient: Option<NutrientInfo>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NutrientInfo {
    id: u32,
}

/// Per-100g amounts picked out of a USDA nutrient list
#[derive(Debug, Default)]
struct Macros {
    energy: Option<f64>,
    energy_atwater: Option<f64>,
    protein: f64,
    fat: f64,
    carbs: f64,
    fiber: Option<f64>,
}

impl Macros {
    fn collect(nutrients: impl IntoIterator<Item = (u32, f64)>) -> Self {
        let mut macros = Self::default();
        for (id, amount) in nutrients {
            match id {
                NUTRIENT_ENERGY_KCAL => macros.energy = Some(amount),
                NUTRIENT_ENERGY_ATWATER_GENERAL | NUTRIENT_ENERGY_ATWATER_SPECIFIC => {
                    macros.energy_atwater.get_or_insert(amount);
                }
                NUTRIENT_PROTEIN => macros.protein = amount,
                NUTRIENT_FAT => macros.fat = amount,
                NUTRIENT_CARBS => macros.carbs = amount,
                NUTRIENT_FIBER => macros.fiber = Some(amount),
                _ => {}
            }
        }
        macros
    }

    fn into_food(
        self,
        fdc_id: u64,
        name: String,
        brand: Option<String>,
        serving: Option<(f64, Option<&str>)>,
    ) -> FoodItem {
        let serving_size_g = serving.and_then(|(size, unit)| match unit {
            None => Some(size),
            Some(unit) if unit.eq_ignore_ascii_case("g") || unit.eq_ignore_ascii_case("grm") => {
                Some(size)
            }
            Some(_) => None,
        });
        FoodItem {
            brand,
            source: FoodSource::Usda,
            external_id: Some(fdc_id.to_string()),
            fiber_per_100g: self.fiber,
            serving_size_g,
            ..FoodItem::new(
                name,
                self.energy.or(self.energy_atwater).unwrap_or_default(),
                self.protein,
                self.carbs,
                self.fat,
            )
        }
    }
}

impl From<SearchFood> for FoodItem {
    fn from(food: SearchFood) -> Self {
        let macros = Macros::collect(
            food.food_nutrients
                .iter()
                .filter_map(|n| n.value.map(|v| (n.nutrient_id, v))),
        );
        let serving = food
            .serving_size
            .map(|size| (size, food.serving_size_unit.as_deref()));
        macros.into_food(
            food.fdc_id,
            food.description,
            food.brand_name.or(food.brand_owner),
            serving,
        )
    }
}

impl From<FoodDetailsResponse> for FoodItem {
    fn from(food: FoodDetailsResponse) -> Self {
        let macros = Macros::collect(
            food.food_nutrients
                .iter()
                .filter_map(|n| Some((n.nutrient.as_ref()?.id, n.amount?))),
        );
        let serving = food
            .serving_size
            .map(|size| (size, food.serving_size_unit.as_deref()));
        macros.into_food(food.fdc_id, food.description, food.brand_owner, serving)
    }
}

#[derive(Debug, Clone)]
struct Expiring<T> {
    data: T,
    expires_at: Instant,
}

/// Rolling-window request budget
#[derive(Debug)]
struct RateLimiter {
    requests: Mutex<VecDeque<Instant>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(limit: u32, window: Duration) -> Self {
        Self {
            requests: Mutex::new(VecDeque::new()),
            limit: (limit as usize).max(1),
            window,
        }
    }

    /// Wait for a free slot and claim it
    async fn acquire(&self) {
        loop {
            let wait = {
                let mut requests = self.requests.lock().await;
                let now = Instant::now();
                while requests
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    requests.pop_front();
                }
                if requests.len() < self.limit {
                    requests.push_back(now);
                    return;
                }
                requests
                    .front()
                    .map_or(self.window, |oldest| self.window - now.duration_since(*oldest))
            };
            debug!(wait_ms = wait.as_millis() as u64, "USDA rate limit reached, waiting");
            tokio::time::sleep(wait).await;
        }
    }
}

/// Number of live entries in each cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsdaCacheStats {
    /// Cached search result lists
    pub search_entries: usize,
    /// Cached food details
    pub details_entries: usize,
}

/// USDA `FoodData` Central API Client
pub struct UsdaClient {
    config: UsdaClientConfig,
    http_client: reqwest::Client,
    search_cache: Mutex<LruCache<String, Expiring<Vec<FoodItem>>>>,
    details_cache: Mutex<LruCache<u64, Expiring<FoodItem>>>,
    rate_limiter: RateLimiter,
}

impl UsdaClient {
    /// Create a new USDA API client
    #[must_use]
    pub fn new(config: UsdaClientConfig) -> Self {
        Self::with_client(api_client(), config)
    }

    /// Client using a caller-supplied HTTP client
    #[must_use]
    pub fn with_client(http_client: reqwest::Client, config: UsdaClientConfig) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        let rate_limiter = RateLimiter::new(config.rate_limit_per_minute, Duration::from_secs(60));
        Self {
            config,
            http_client,
            search_cache: Mutex::new(LruCache::new(capacity)),
            details_cache: Mutex::new(LruCache::new(capacity)),
            rate_limiter,
        }
    }

    fn expiry(&self) -> Instant {
        Instant::now() + Duration::from_secs(self.config.cache_ttl_secs)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        self.rate_limiter.acquire().await;

        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(&url)
            .query(query)
            .query(&[("api_key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::external_unavailable(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::from_upstream_status(SERVICE, status.as_u16(), &body));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE, format!("invalid JSON: {e}")))
    }

    /// Search for foods by query string
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty, `page_size` is outside
    /// 1..=200, or the API request fails
    #[instrument(skip(self), fields(service = SERVICE))]
    pub async fn search_foods(&self, query: &str, page_size: u32) -> AppResult<Vec<FoodItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }
        if page_size == 0 || page_size > 200 {
            return Err(AppError::invalid_input(
                "Page size must be between 1 and 200",
            ));
        }

        let cache_key = format!("{}:{page_size}", query.to_lowercase());
        if let Some(entry) = self.search_cache.lock().await.get(&cache_key) {
            if Instant::now() < entry.expires_at {
                debug!("USDA search served from cache");
                return Ok(entry.data.clone());
            }
        }

        let response: SearchResponse = self
            .get_json(
                "/foods/search",
                &[
                    ("query", query.to_owned()),
                    ("pageSize", page_size.to_string()),
                ],
            )
            .await?;
        let foods: Vec<FoodItem> = response.foods.into_iter().map(FoodItem::from).collect();
        debug!(results = foods.len(), "USDA search complete");

        self.search_cache.lock().await.put(
            cache_key,
            Expiring {
                data: foods.clone(),
                expires_at: self.expiry(),
            },
        );
        Ok(foods)
    }

    /// Full nutrient profile of one food by FDC ID
    ///
    /// # Errors
    ///
    /// Returns not found for unknown ids, or an error if the API request fails
    #[instrument(skip(self), fields(service = SERVICE))]
    pub async fn get_food_details(&self, fdc_id: u64) -> AppResult<FoodItem> {
        if let Some(entry) = self.details_cache.lock().await.get(&fdc_id) {
            if Instant::now() < entry.expires_at {
                return Ok(entry.data.clone());
            }
        }

        let details: FoodDetailsResponse = match self.get_json(&format!("/food/{fdc_id}"), &[]).await
        {
            Ok(details) => details,
            Err(e) if e.context.details["upstream_status"] == 404 => {
                return Err(AppError::not_found(format!("USDA food {fdc_id}")));
            }
            Err(e) => return Err(e),
        };
        let food = FoodItem::from(details);

        self.details_cache.lock().await.put(
            fdc_id,
            Expiring {
                data: food.clone(),
                expires_at: self.expiry(),
            },
        );
        Ok(food)
    }

    /// Drop every cached response
    pub async fn clear_caches(&self) {
        self.search_cache.lock().await.clear();
        self.details_cache.lock().await.clear();
    }

    /// Current cache sizes
    pub async fn cache_stats(&self) -> UsdaCacheStats {
        UsdaCacheStats {
            search_entries: self.search_cache.lock().await.len(),
            details_entries: self.details_cache.lock().await.len(),
        }
    }
}

#[async_trait]
impl FoodSearchProvider for UsdaClient {
    fn source(&self) -> FoodSource {
        FoodSource::Usda
    }

    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<FoodItem>> {
        self.search_foods(query, limit.clamp(1, 200)).await
    }
}
