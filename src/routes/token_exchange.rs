// ABOUTME: Token exchange proxy route handlers for provider OAuth codes and tokens
// ABOUTME: Validates camelCase request bodies and returns normalized token JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Token exchange routes
//!
//! - `POST /token-exchange` `{ code, provider, redirectUri, codeVerifier? }`
//! - `POST /refresh-token` `{ refreshToken, provider }`
//! - `POST /revoke-token` `{ token, provider }`
//!
//! Validation failures answer 400 with `{ "error": ... }`. Revocation
//! answers `{ "success": true }` whenever the request itself is valid; the
//! provider's answer is only logged.

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::oauth2_client::{OAuthProvider, TokenExchangeClient, TokenResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Body of `POST /token-exchange`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    /// Authorization code
    pub code: Option<String>,
    /// Provider name
    pub provider: Option<String>,
    /// Redirect URI used in the authorization request
    pub redirect_uri: Option<String>,
    /// PKCE verifier, when the app used PKCE
    pub code_verifier: Option<String>,
}

/// Body of `POST /refresh-token`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// Refresh token
    pub refresh_token: Option<String>,
    /// Provider name
    pub provider: Option<String>,
}

/// Body of `POST /revoke-token`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeTokenRequest {
    /// Access or refresh token to revoke
    pub token: Option<String>,
    /// Provider name
    pub provider: Option<String>,
}

/// Body of a successful revocation
#[derive(Debug, Serialize, Deserialize)]
pub struct RevokeResponse {
    /// Always true
    pub success: bool,
}

/// Non-empty value of an optional field
fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Error naming every missing field
fn require<'a, const N: usize>(
    fields: [(&'static str, Option<&'a String>); N],
) -> AppResult<[&'a str; N]> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| present(*value).is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required fields: {}", missing.join(", ")),
        ));
    }
    Ok(fields.map(|(_, value)| present(value).unwrap_or_default()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid_input(format!("Invalid request body: {rejection}")))
}

/// The app made a bad request when the provider rejected its grant
fn client_facing(error: AppError) -> AppError {
    match error.code {
        ErrorCode::ExternalRequestRejected | ErrorCode::ExternalAuthFailed => {
            AppError::invalid_input(error.message)
        }
        _ => error,
    }
}

/// Token exchange route handlers
pub struct TokenExchangeRoutes;

impl TokenExchangeRoutes {
    /// Token exchange, refresh, and revocation routes
    pub fn routes(client: Arc<TokenExchangeClient>) -> Router {
        Router::new()
            .route("/token-exchange", post(Self::handle_exchange))
            .route("/refresh-token", post(Self::handle_refresh))
            .route("/revoke-token", post(Self::handle_revoke))
            .with_state(client)
    }

    async fn handle_exchange(
        State(client): State<Arc<TokenExchangeClient>>,
        payload: Result<Json<TokenExchangeRequest>, JsonRejection>,
    ) -> AppResult<Json<TokenResponse>> {
        let request = body(payload)?;
        let [code, provider, redirect_uri] = require([
            ("code", request.code.as_ref()),
            ("provider", request.provider.as_ref()),
            ("redirectUri", request.redirect_uri.as_ref()),
        ])?;
        let provider: OAuthProvider = provider.parse()?;

        let token = client
            .exchange_code(
                provider,
                code,
                redirect_uri,
                present(request.code_verifier.as_ref()),
            )
            .await
            .map_err(client_facing)?;
        Ok(Json(token))
    }

    async fn handle_refresh(
        State(client): State<Arc<TokenExchangeClient>>,
        payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
    ) -> AppResult<Json<TokenResponse>> {
        let request = body(payload)?;
        let [refresh_token, provider] = require([
            ("refreshToken", request.refresh_token.as_ref()),
            ("provider", request.provider.as_ref()),
        ])?;
        let provider: OAuthProvider = provider.parse()?;

        let token = client
            .refresh(provider, refresh_token)
            .await
            .map_err(client_facing)?;
        Ok(Json(token))
    }

    async fn handle_revoke(
        State(client): State<Arc<TokenExchangeClient>>,
        payload: Result<Json<RevokeTokenRequest>, JsonRejection>,
    ) -> AppResult<Json<RevokeResponse>> {
        let request = body(payload)?;
        let [token, provider] = require([
            ("token", request.token.as_ref()),
            ("provider", request.provider.as_ref()),
        ])?;
        let provider: OAuthProvider = provider.parse()?;

        if let Err(e) = client.revoke(provider, token).await {
            warn!(provider = %provider, error = %e, "Token revocation failed upstream");
        }
        Ok(Json(RevokeResponse { success: true }))
    }
}
