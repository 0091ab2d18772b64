// ABOUTME: Open Food Facts product search client
// ABOUTME: Maps products with per-100g nutriments to food items under a short request timeout
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::FoodSearchProvider;
use crate::config::environment::DEFAULT_OPEN_FOOD_FACTS_BASE_URL;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::food_search_client;
use async_trait::async_trait;
use coach_core::models::{FoodItem, FoodSource};
use serde::Deserialize;
use tracing::{debug, instrument};

const SERVICE: &str = "open_food_facts";

/// Fields requested from the search endpoint
const SEARCH_FIELDS: &str = "code,product_name,brands,nutriments,serving_quantity";

/// Largest page the search endpoint serves
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    code: Option<String>,
    product_name: Option<String>,
    brands: Option<String>,
    #[serde(default)]
    nutriments: Nutriments,
    #[serde(default, deserialize_with = "lenient_f64")]
    serving_quantity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_f64")]
    energy_kcal: Option<f64>,
    #[serde(rename = "energy_100g", default, deserialize_with = "lenient_f64")]
    energy_kj: Option<f64>,
    #[serde(rename = "proteins_100g", default, deserialize_with = "lenient_f64")]
    proteins: Option<f64>,
    #[serde(rename = "carbohydrates_100g", default, deserialize_with = "lenient_f64")]
    carbohydrates: Option<f64>,
    #[serde(rename = "fat_100g", default, deserialize_with = "lenient_f64")]
    fat: Option<f64>,
    #[serde(rename = "fiber_100g", default, deserialize_with = "lenient_f64")]
    fiber: Option<f64>,
}

/// Open Food Facts sends numbers both as JSON numbers and as strings
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

const KJ_PER_KCAL: f64 = 4.184;

impl Product {
    /// Products without a name or an energy value are skipped
    fn into_food(self) -> Option<FoodItem> {
        let name = self
            .product_name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())?;
        let n = self.nutriments;
        let calories = n.energy_kcal.or_else(|| n.energy_kj.map(|kj| kj / KJ_PER_KCAL))?;
        let brand = self
            .brands
            .as_deref()
            .and_then(|brands| brands.split(',').next())
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_owned);
        Some(FoodItem {
            brand,
            source: FoodSource::OpenFoodFacts,
            external_id: self.code,
            fiber_per_100g: n.fiber,
            serving_size_g: self.serving_quantity.filter(|q| *q > 0.0),
            ..FoodItem::new(
                name,
                calories,
                n.proteins.unwrap_or_default(),
                n.carbohydrates.unwrap_or_default(),
                n.fat.unwrap_or_default(),
            )
        })
    }
}

/// Open Food Facts search client
#[derive(Clone)]
pub struct OpenFoodFactsClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for OpenFoodFactsClient {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_FOOD_FACTS_BASE_URL)
    }
}

impl OpenFoodFactsClient {
    /// Client against `base_url` with the 8 second search timeout
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(food_search_client(), base_url)
    }

    /// Client using a caller-supplied HTTP client
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Search products by free text
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty, the request times out, or the
    /// response is not a product list
    #[instrument(skip(self), fields(service = SERVICE))]
    pub async fn search_products(&self, query: &str, page_size: u32) -> AppResult<Vec<FoodItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE).to_string();

        let response = self
            .client
            .get(format!("{}/cgi/search.pl", self.base_url))
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
                ("fields", SEARCH_FIELDS),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::external_unavailable(SERVICE, "search timed out")
                } else {
                    AppError::external_unavailable(SERVICE, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::from_upstream_status(SERVICE, status.as_u16(), &body));
        }
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE, format!("invalid JSON: {e}")))?;

        let total = body.products.len();
        let foods: Vec<FoodItem> = body
            .products
            .into_iter()
            .filter_map(Product::into_food)
            .collect();
        debug!(total, usable = foods.len(), "Open Food Facts search complete");
        Ok(foods)
    }
}

#[async_trait]
impl FoodSearchProvider for OpenFoodFactsClient {
    fn source(&self) -> FoodSource {
        FoodSource::OpenFoodFacts
    }

    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<FoodItem>> {
        self.search_products(query, limit).await
    }
}
