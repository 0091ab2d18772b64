// ABOUTME: Supabase backend client speaking the PostgREST dialect over reqwest
// ABOUTME: Sends apikey and bearer headers, maps filters to query params, and classifies HTTP failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{BackendClient, Direction, Query};
use crate::config::BackendConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::backend_client;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

const SERVICE: &str = "backend";

/// PostgREST client for a Supabase project
#[derive(Debug)]
pub struct RestBackend {
    client: Client,
    rest_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

impl RestBackend {
    /// Client for the project at `base_url` (e.g. `https://xyz.supabase.co`)
    #[must_use]
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Self {
        Self::with_client(backend_client(), base_url, anon_key)
    }

    /// Client using a preconfigured `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            anon_key: anon_key.into(),
            access_token: RwLock::new(None),
        }
    }

    /// Client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL or key is missing
    pub fn from_config(config: &BackendConfig) -> AppResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| AppError::config("SUPABASE_URL is not set"))?;
        let key = config
            .anon_key
            .as_deref()
            .ok_or_else(|| AppError::config("SUPABASE_ANON_KEY is not set"))?;
        Ok(Self::new(url, key))
    }

    async fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.anon_key.clone());
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header("Accept", "application/json")
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    fn query_params(query: &Query, include_select: bool) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if include_select {
            params.push(("select".to_owned(), query.columns.clone()));
        }
        for filter in &query.filters {
            params.push((filter.column.clone(), filter.to_postgrest()));
        }
        if !query.order.is_empty() {
            let order: Vec<String> = query
                .order
                .iter()
                .map(|(column, direction)| match direction {
                    Direction::Asc => format!("{column}.asc"),
                    Direction::Desc => format!("{column}.desc"),
                })
                .collect();
            params.push(("order".to_owned(), order.join(",")));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }
        params
    }

    async fn rows(response: Response) -> AppResult<Vec<Value>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::from_upstream_status(SERVICE, status.as_u16(), &body));
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}

#[async_trait::async_trait]
impl BackendClient for RestBackend {
    #[instrument(skip(self), fields(table = %query.table))]
    async fn select(&self, query: &Query) -> AppResult<Vec<Value>> {
        let builder = self
            .client
            .get(self.table_url(&query.table))
            .query(&Self::query_params(query, true));
        let response = self.request(builder).await.send().await?;
        let rows = Self::rows(response).await?;
        debug!(rows = rows.len(), "Backend select");
        Ok(rows)
    }

    #[instrument(skip(self, rows))]
    async fn insert(&self, table: &str, rows: Value) -> AppResult<Vec<Value>> {
        let builder = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);
        Self::rows(self.request(builder).await.send().await?).await
    }

    #[instrument(skip(self, patch), fields(table = %query.table))]
    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>> {
        if query.filters.is_empty() {
            return Err(AppError::invalid_input(
                "Refusing to update every row: query has no filters",
            ));
        }
        let builder = self
            .client
            .patch(self.table_url(&query.table))
            .query(&Self::query_params(query, false))
            .header("Prefer", "return=representation")
            .json(&patch);
        Self::rows(self.request(builder).await.send().await?).await
    }

    #[instrument(skip(self, rows))]
    async fn upsert(&self, table: &str, rows: Value, on_conflict: &str) -> AppResult<Vec<Value>> {
        let builder = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(&rows);
        Self::rows(self.request(builder).await.send().await?).await
    }

    #[instrument(skip(self), fields(table = %query.table))]
    async fn delete(&self, query: &Query) -> AppResult<u64> {
        if query.filters.is_empty() {
            return Err(AppError::invalid_input(
                "Refusing to delete every row: query has no filters",
            ));
        }
        let builder = self
            .client
            .delete(self.table_url(&query.table))
            .query(&Self::query_params(query, false))
            .header("Prefer", "return=representation");
        let removed = Self::rows(self.request(builder).await.send().await?).await?;
        Ok(removed.len() as u64)
    }

    async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }
}
