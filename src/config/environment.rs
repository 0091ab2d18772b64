// ABOUTME: Environment configuration for the coach services and CLI
// ABOUTME: Parses backend, external API, OAuth provider, and sync policy settings from env vars
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration

use crate::constants::sync::{
    DEFAULT_BASE_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF_SECS,
};
use crate::errors::{AppError, AppResult};
use crate::oauth2_client::OAuthProvider;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Default port of the token exchange proxy
pub const DEFAULT_HTTP_PORT: u16 = 3001;

/// Default OpenRouter API base URL
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default OpenRouter model
pub const DEFAULT_OPENROUTER_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// Default Open Food Facts base URL
pub const DEFAULT_OPEN_FOOD_FACTS_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Default USDA FoodData Central base URL
pub const DEFAULT_USDA_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// Default HeyGainz exercise API base URL
pub const DEFAULT_HEYGAINZ_BASE_URL: &str = "https://api.heygainz.com/api";

/// Hosted backend (Supabase) connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: Option<String>,
    /// Anonymous API key sent as `apikey`
    pub anon_key: Option<String>,
}

impl BackendConfig {
    /// Both URL and key are present
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }
}

/// LLM program generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenRouter API key
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// API base URL
    pub base_url: String,
}

/// Food and exercise data API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataApiConfig {
    /// USDA FoodData Central API key
    pub usda_api_key: Option<String>,
    /// USDA base URL
    pub usda_base_url: String,
    /// Open Food Facts base URL
    pub open_food_facts_base_url: String,
    /// HeyGainz base URL
    pub heygainz_base_url: String,
}

/// Credentials and endpoints of one OAuth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthProviderConfig {
    /// OAuth client ID
    pub client_id: Option<String>,
    /// OAuth client secret, never leaves the proxy
    pub client_secret: Option<String>,
    /// Token endpoint
    pub token_url: String,
    /// Revocation endpoint, if the provider has one
    pub revoke_url: Option<String>,
}

impl OAuthProviderConfig {
    /// Read `{PREFIX}_CLIENT_ID`, `{PREFIX}_CLIENT_SECRET`, and the optional URL overrides
    fn from_env(provider: OAuthProvider) -> Self {
        let prefix = provider.env_prefix();
        Self {
            client_id: env::var(format!("{prefix}_CLIENT_ID")).ok(),
            client_secret: env::var(format!("{prefix}_CLIENT_SECRET")).ok(),
            token_url: env::var(format!("{prefix}_TOKEN_URL"))
                .unwrap_or_else(|_| provider.default_token_url().to_owned()),
            revoke_url: env::var(format!("{prefix}_REVOKE_URL"))
                .ok()
                .or_else(|| provider.default_revoke_url().map(str::to_owned)),
        }
    }

    /// Client id and secret are both set
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// OAuth provider settings for the token exchange proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthProxyConfig {
    /// Fitbit
    pub fitbit: OAuthProviderConfig,
    /// Garmin
    pub garmin: OAuthProviderConfig,
    /// Google Fit
    pub google_fit: OAuthProviderConfig,
}

impl OAuthProxyConfig {
    /// Settings of `provider`
    #[must_use]
    pub const fn provider(&self, provider: OAuthProvider) -> &OAuthProviderConfig {
        match provider {
            OAuthProvider::Fitbit => &self.fitbit,
            OAuthProvider::Garmin => &self.garmin,
            OAuthProvider::GoogleFit => &self.google_fit,
        }
    }

    /// Mutable settings of `provider`
    pub fn provider_mut(&mut self, provider: OAuthProvider) -> &mut OAuthProviderConfig {
        match provider {
            OAuthProvider::Fitbit => &mut self.fitbit,
            OAuthProvider::Garmin => &mut self.garmin,
            OAuthProvider::GoogleFit => &mut self.google_fit,
        }
    }

    fn from_env() -> Self {
        Self {
            fitbit: OAuthProviderConfig::from_env(OAuthProvider::Fitbit),
            garmin: OAuthProviderConfig::from_env(OAuthProvider::Garmin),
            google_fit: OAuthProviderConfig::from_env(OAuthProvider::GoogleFit),
        }
    }
}

/// Sync queue replay policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Attempts before a retryable failure is dead-lettered
    pub max_attempts: u32,
    /// First retry delay in seconds
    pub base_backoff_secs: u64,
    /// Cap for the retry delay in seconds
    pub max_backoff_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff_secs: DEFAULT_BASE_BACKOFF_SECS,
            max_backoff_secs: DEFAULT_MAX_BACKOFF_SECS,
        }
    }
}

impl SyncConfig {
    /// Delay before retry number `attempts` (1-based): `base * 2^(attempts - 1)`, capped
    #[must_use]
    pub fn backoff(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(31);
        let secs = self
            .base_backoff_secs
            .saturating_mul(1_u64 << exponent)
            .min(self.max_backoff_secs);
        Duration::from_secs(secs)
    }
}

/// Complete configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Token exchange proxy port
    pub http_port: u16,
    /// Comma-separated CORS origins for the proxy, `*` for any
    pub cors_allowed_origins: String,
    /// Local SQLite store URL
    pub database_url: String,
    /// Hosted backend
    pub backend: BackendConfig,
    /// Program generation LLM
    pub llm: LlmConfig,
    /// Food and exercise APIs
    pub data_apis: DataApiConfig,
    /// OAuth providers
    pub oauth: OAuthProxyConfig,
    /// Sync replay policy
    pub sync: SyncConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: env_parse("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            cors_allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            database_url: env::var("COACH_DATABASE_URL").unwrap_or_else(|_| default_database_url()),
            backend: BackendConfig {
                url: env::var("SUPABASE_URL").ok(),
                anon_key: env::var("SUPABASE_ANON_KEY").ok(),
            },
            llm: LlmConfig {
                api_key: env::var("OPENROUTER_API_KEY").ok(),
                model: env_var_or("OPENROUTER_MODEL", DEFAULT_OPENROUTER_MODEL),
                base_url: env_var_or("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL),
            },
            data_apis: DataApiConfig {
                usda_api_key: env::var("USDA_API_KEY").ok(),
                usda_base_url: env_var_or("USDA_BASE_URL", DEFAULT_USDA_BASE_URL),
                open_food_facts_base_url: env_var_or(
                    "OPEN_FOOD_FACTS_BASE_URL",
                    DEFAULT_OPEN_FOOD_FACTS_BASE_URL,
                ),
                heygainz_base_url: env_var_or("HEYGAINZ_BASE_URL", DEFAULT_HEYGAINZ_BASE_URL),
            },
            oauth: OAuthProxyConfig::from_env(),
            sync: SyncConfig {
                max_attempts: env_parse("SYNC_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
                base_backoff_secs: env_parse("SYNC_BASE_BACKOFF_SECS", DEFAULT_BASE_BACKOFF_SECS)?,
                max_backoff_secs: env_parse("SYNC_MAX_BACKOFF_SECS", DEFAULT_MAX_BACKOFF_SECS)?,
            },
        };

        config.warn_on_gaps();
        Ok(config)
    }

    fn warn_on_gaps(&self) {
        if !self.backend.is_configured() {
            warn!("SUPABASE_URL or SUPABASE_ANON_KEY missing; backend calls will fail");
        }
        for provider in OAuthProvider::ALL {
            if !self.oauth.provider(provider).has_credentials() {
                warn!(provider = %provider, "OAuth provider has no client credentials");
            }
        }
    }

    /// Summary of the configuration for logging, with secrets redacted
    #[must_use]
    pub fn summary(&self) -> String {
        let enabled = |set: bool| if set { "Enabled" } else { "Disabled" };
        format!(
            "Pierre Coach Configuration:\n\
             - HTTP Port: {}\n\
             - Local Store: {}\n\
             - Backend: {}\n\
             - OpenRouter: {} ({})\n\
             - USDA: {}\n\
             - Fitbit OAuth: {}\n\
             - Garmin OAuth: {}\n\
             - Google Fit OAuth: {}\n\
             - Sync: max {} attempts, backoff {}s..{}s",
            self.http_port,
            redact_database_url(&self.database_url),
            self.backend.url.as_deref().unwrap_or("not configured"),
            enabled(self.llm.api_key.is_some()),
            self.llm.model,
            enabled(self.data_apis.usda_api_key.is_some()),
            enabled(self.oauth.fitbit.has_credentials()),
            enabled(self.oauth.garmin.has_credentials()),
            enabled(self.oauth.google_fit.has_credentials()),
            self.sync.max_attempts,
            self.sync.base_backoff_secs,
            self.sync.max_backoff_secs,
        )
    }
}

/// Local store under the platform data directory
fn default_database_url() -> String {
    dirs::data_local_dir().map_or_else(
        || "sqlite:coach.db?mode=rwc".to_owned(),
        |dir| {
            format!(
                "sqlite:{}?mode=rwc",
                dir.join("pierre-coach").join("coach.db").display()
            )
        },
    )
}

fn redact_database_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn env_parse<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let sync = SyncConfig {
            max_attempts: 5,
            base_backoff_secs: 5,
            max_backoff_secs: 60,
        };
        assert_eq!(sync.backoff(1), Duration::from_secs(5));
        assert_eq!(sync.backoff(2), Duration::from_secs(10));
        assert_eq!(sync.backoff(4), Duration::from_secs(40));
        assert_eq!(sync.backoff(5), Duration::from_secs(60));
        assert_eq!(sync.backoff(200), Duration::from_secs(60));
    }

    #[test]
    fn test_redact_database_url_drops_query() {
        assert_eq!(
            redact_database_url("sqlite:/tmp/coach.db?mode=rwc"),
            "sqlite:/tmp/coach.db"
        );
    }
}
