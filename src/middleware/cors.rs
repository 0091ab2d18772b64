// ABOUTME: CORS middleware configuration for the token exchange proxy
// ABOUTME: Allows the configured app origins to call the JSON endpoints
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// CORS layer for a comma-separated origin list
///
/// An empty list or `*` allows any origin, which suits the mobile app and
/// local development. Anything else is parsed as explicit origins; entries
/// that are not valid header values are dropped.
///
/// ```bash
/// export CORS_ALLOWED_ORIGINS="https://app.example.com,http://localhost:8081"
/// ```
#[must_use]
pub fn setup_cors(allowed_origins: &str) -> CorsLayer {
    let allowed_origins = allowed_origins.trim();
    let allow_origin = if allowed_origins.is_empty() || allowed_origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-request-id"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
