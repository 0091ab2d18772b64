// ABOUTME: Shared HTTP client utilities with connection pooling and timeout configuration
// ABOUTME: One constructor per outbound purpose so every external call carries an explicit timeout
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::timeouts::{
    BACKEND_REQUEST_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS, LLM_REQUEST_TIMEOUT_SECS,
    OAUTH_CONNECT_TIMEOUT_SECS, OAUTH_REQUEST_TIMEOUT_SECS, OPEN_FOOD_FACTS_TIMEOUT_SECS,
};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create a new HTTP client with custom timeout settings
///
/// Falls back to a default client if the builder fails, which only happens
/// when the TLS backend cannot initialize.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .user_agent(concat!("pierre-coach/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Client for OAuth token exchanges (15s request, 5s connect)
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(OAUTH_REQUEST_TIMEOUT_SECS, OAUTH_CONNECT_TIMEOUT_SECS)
}

/// Client for the hosted backend (30s)
#[must_use]
pub fn backend_client() -> Client {
    create_client_with_timeout(BACKEND_REQUEST_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)
}

/// Client for program generation (5 minutes)
#[must_use]
pub fn llm_client() -> Client {
    create_client_with_timeout(LLM_REQUEST_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)
}

/// Client for Open Food Facts searches (8s)
#[must_use]
pub fn food_search_client() -> Client {
    create_client_with_timeout(OPEN_FOOD_FACTS_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)
}

/// Client for other data APIs (30s)
#[must_use]
pub fn api_client() -> Client {
    create_client_with_timeout(BACKEND_REQUEST_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)
}
