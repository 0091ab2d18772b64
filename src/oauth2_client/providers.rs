// ABOUTME: Fitness providers supported by the token exchange proxy
// ABOUTME: Provider names, environment prefixes, and default token and revocation endpoints
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OAuth provider handled by the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthProvider {
    /// Fitbit Web API
    Fitbit,
    /// Garmin Connect
    Garmin,
    /// Google Fit
    GoogleFit,
}

impl OAuthProvider {
    /// Every supported provider
    pub const ALL: [Self; 3] = [Self::Fitbit, Self::Garmin, Self::GoogleFit];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fitbit => "fitbit",
            Self::Garmin => "garmin",
            Self::GoogleFit => "google_fit",
        }
    }

    /// Prefix of the provider's environment variables
    #[must_use]
    pub const fn env_prefix(self) -> &'static str {
        match self {
            Self::Fitbit => "FITBIT",
            Self::Garmin => "GARMIN",
            Self::GoogleFit => "GOOGLE_FIT",
        }
    }

    /// Token endpoint used unless overridden
    #[must_use]
    pub const fn default_token_url(self) -> &'static str {
        match self {
            Self::Fitbit => "https://api.fitbit.com/oauth2/token",
            Self::Garmin => "https://connectapi.garmin.com/oauth-service/oauth/access_token",
            Self::GoogleFit => "https://oauth2.googleapis.com/token",
        }
    }

    /// Revocation endpoint used unless overridden
    #[must_use]
    pub const fn default_revoke_url(self) -> Option<&'static str> {
        match self {
            Self::Fitbit => Some("https://api.fitbit.com/oauth2/revoke"),
            Self::Garmin => Some("https://connectapi.garmin.com/oauth-service/oauth/revoke"),
            Self::GoogleFit => Some("https://oauth2.googleapis.com/revoke"),
        }
    }

    /// Client credentials go in an HTTP Basic header instead of the form body
    #[must_use]
    pub const fn uses_basic_auth(self) -> bool {
        matches!(self, Self::Fitbit)
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fitbit" => Ok(Self::Fitbit),
            "garmin" => Ok(Self::Garmin),
            "google_fit" | "google-fit" | "googlefit" => Ok(Self::GoogleFit),
            other => Err(AppError::invalid_input(format!(
                "Unsupported provider: {other}"
            ))),
        }
    }
}
