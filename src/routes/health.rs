// ABOUTME: Health check route for the token exchange proxy
// ABOUTME: Reports liveness and which providers have credentials configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::oauth2_client::{OAuthProvider, TokenExchangeClient};
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// `GET /health`
    pub fn routes(client: Arc<TokenExchangeClient>) -> axum::Router {
        use axum::{extract::State, routing::get, Json, Router};

        async fn health_handler(
            State(client): State<Arc<TokenExchangeClient>>,
        ) -> Json<serde_json::Value> {
            let providers: serde_json::Map<String, serde_json::Value> = OAuthProvider::ALL
                .iter()
                .map(|provider| {
                    (
                        provider.as_str().to_owned(),
                        serde_json::Value::Bool(
                            client.provider_config(*provider).has_credentials(),
                        ),
                    )
                })
                .collect();
            Json(serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "providers": providers,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }

        Router::new()
            .route("/health", get(health_handler))
            .with_state(client)
    }
}
