// ABOUTME: Route module organization for the token exchange proxy HTTP endpoints
// ABOUTME: Health check plus the OAuth code exchange, refresh, and revocation routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Routes of the token exchange proxy
//!
//! Handlers stay thin and delegate to [`TokenExchangeClient`]; the binary
//! adds CORS and tracing layers around [`router`].

/// Health check route
pub mod health;
/// OAuth token exchange routes
pub mod token_exchange;

pub use health::HealthRoutes;
pub use token_exchange::{
    RefreshTokenRequest, RevokeResponse, RevokeTokenRequest, TokenExchangeRequest,
    TokenExchangeRoutes,
};

use crate::oauth2_client::TokenExchangeClient;
use axum::Router;
use std::sync::Arc;

/// Every proxy route, without middleware
pub fn router(client: Arc<TokenExchangeClient>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&client)))
        .merge(TokenExchangeRoutes::routes(client))
}
