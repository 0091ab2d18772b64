// ABOUTME: Server-side OAuth 2.0 token exchange, refresh, and revocation against fitness providers
// ABOUTME: Holds client secrets and normalizes provider token responses into one JSON shape
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::OAuthProvider;
use crate::config::{OAuthProviderConfig, OAuthProxyConfig};
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::oauth_client;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Token set returned to the app, identical for every provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token
    pub access_token: String,
    /// Refresh token, when the provider issued one
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: Option<i64>,
    /// Token type, usually "Bearer"
    pub token_type: String,
    /// Granted scopes
    pub scope: Option<String>,
    /// Provider-side user id
    pub user_id: Option<String>,
    /// Issuing provider
    pub provider: OAuthProvider,
}

/// Raw token response; providers disagree on optional fields
#[derive(Debug, Deserialize)]
struct ProviderTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Upstream error text without echoing secrets back
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<ProviderError>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |parsed| match (parsed.error, parsed.error_description) {
            (Some(error), Some(description)) => format!("{error}: {description}"),
            (Some(error), None) => error,
            (None, Some(description)) => description,
            (None, None) => body.chars().take(200).collect(),
        },
    )
}

/// Client credentials of one provider
struct Credentials<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

/// Token endpoint client used by the proxy
#[derive(Clone)]
pub struct TokenExchangeClient {
    http: reqwest::Client,
    config: OAuthProxyConfig,
}

impl TokenExchangeClient {
    /// Client with the OAuth timeouts
    #[must_use]
    pub fn new(config: OAuthProxyConfig) -> Self {
        Self::with_client(oauth_client(), config)
    }

    /// Client using a caller-supplied HTTP client
    #[must_use]
    pub const fn with_client(http: reqwest::Client, config: OAuthProxyConfig) -> Self {
        Self { http, config }
    }

    /// Provider settings in use
    #[must_use]
    pub const fn provider_config(&self, provider: OAuthProvider) -> &OAuthProviderConfig {
        self.config.provider(provider)
    }

    fn credentials(&self, provider: OAuthProvider) -> AppResult<Credentials<'_>> {
        let config = self.config.provider(provider);
        match (&config.client_id, &config.client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Credentials {
                client_id,
                client_secret,
            }),
            _ => Err(AppError::config(format!(
                "{provider} OAuth credentials are not configured"
            ))),
        }
    }

    /// Form POST carrying the client credentials the way `provider` expects
    fn authorized_post(
        &self,
        provider: OAuthProvider,
        url: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> AppResult<reqwest::RequestBuilder> {
        let credentials = self.credentials(provider)?;
        let request = self.http.post(url);
        let request = if provider.uses_basic_auth() {
            let encoded = STANDARD.encode(format!(
                "{}:{}",
                credentials.client_id, credentials.client_secret
            ));
            params.push(("client_id", credentials.client_id.to_owned()));
            request.header(http::header::AUTHORIZATION, format!("Basic {encoded}"))
        } else {
            params.push(("client_id", credentials.client_id.to_owned()));
            params.push(("client_secret", credentials.client_secret.to_owned()));
            request
        };
        Ok(request.form(&params))
    }

    async fn request_token(
        &self,
        provider: OAuthProvider,
        params: Vec<(&'static str, String)>,
    ) -> AppResult<TokenResponse> {
        let token_url = self.config.provider(provider).token_url.clone();
        let response = self
            .authorized_post(provider, &token_url, params)?
            .send()
            .await
            .map_err(|e| AppError::external_unavailable(provider.as_str(), e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::external_unavailable(provider.as_str(), e.to_string()))?;
        if !status.is_success() {
            return Err(AppError::from_upstream_status(
                provider.as_str(),
                status.as_u16(),
                &upstream_message(&body),
            ));
        }
        let raw: ProviderTokenResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::external_service(provider.as_str(), format!("invalid token response: {e}"))
        })?;

        Ok(TokenResponse {
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
            expires_in: raw.expires_in,
            token_type: raw.token_type.unwrap_or_else(|| "Bearer".to_owned()),
            scope: raw.scope,
            user_id: raw.user_id,
            provider,
        })
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    ///
    /// Returns a config error when the provider has no credentials, or the
    /// mapped upstream error when the provider rejects the code
    #[instrument(skip(self, code, code_verifier), fields(provider = %provider))]
    pub async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> AppResult<TokenResponse> {
        let mut params = vec![
            ("grant_type", "authorization_code".to_owned()),
            ("code", code.to_owned()),
            ("redirect_uri", redirect_uri.to_owned()),
        ];
        if let Some(verifier) = code_verifier {
            params.push(("code_verifier", verifier.to_owned()));
        }
        let token = self.request_token(provider, params).await?;
        info!(user_id = ?token.user_id, "Authorization code exchanged");
        Ok(token)
    }

    /// Trade a refresh token for a new access token
    ///
    /// # Errors
    ///
    /// Returns a config error when the provider has no credentials, or the
    /// mapped upstream error when the refresh token is rejected
    #[instrument(skip(self, refresh_token), fields(provider = %provider))]
    pub async fn refresh(
        &self,
        provider: OAuthProvider,
        refresh_token: &str,
    ) -> AppResult<TokenResponse> {
        let params = vec![
            ("grant_type", "refresh_token".to_owned()),
            ("refresh_token", refresh_token.to_owned()),
        ];
        let mut token = self.request_token(provider, params).await?;
        // Google omits the refresh token on refresh; the old one stays valid
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_owned());
        }
        debug!("Access token refreshed");
        Ok(token)
    }

    /// Revoke `token` at the provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider has no credentials or rejects the call
    #[instrument(skip(self, token), fields(provider = %provider))]
    pub async fn revoke(&self, provider: OAuthProvider, token: &str) -> AppResult<()> {
        let Some(revoke_url) = self.config.provider(provider).revoke_url.clone() else {
            debug!("Provider has no revocation endpoint");
            return Ok(());
        };
        let response = self
            .authorized_post(provider, &revoke_url, vec![("token", token.to_owned())])?
            .send()
            .await
            .map_err(|e| AppError::external_unavailable(provider.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| AppError::external_unavailable(provider.as_str(), e.to_string()))?;
            return Err(AppError::from_upstream_status(
                provider.as_str(),
                status.as_u16(),
                &upstream_message(&body),
            ));
        }
        info!("Token revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Authorization code expired"}"#;
        assert_eq!(
            upstream_message(body),
            "invalid_grant: Authorization code expired"
        );
        assert_eq!(upstream_message("Bad Gateway"), "Bad Gateway");
    }
}
