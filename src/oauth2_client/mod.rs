// ABOUTME: OAuth 2.0 client used by the token exchange proxy
// ABOUTME: Exchanges, refreshes, and revokes provider tokens for Fitbit, Garmin, and Google Fit
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # OAuth 2.0 Client Module
//!
//! The mobile app runs the authorization step itself but never sees a
//! client secret. It hands the authorization code to the proxy, which calls
//! the provider's token endpoint with the secret and returns a
//! [`TokenResponse`] in one normalized shape.

/// Token endpoint calls
pub mod client;
/// Supported providers and their endpoints
pub mod providers;

pub use client::{TokenExchangeClient, TokenResponse};
pub use providers::OAuthProvider;
