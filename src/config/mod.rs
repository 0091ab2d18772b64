// ABOUTME: Configuration module for the coach services
// ABOUTME: Environment-only configuration; no config files are read
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Environment variable parsing
pub mod environment;

pub use environment::{
    BackendConfig, DataApiConfig, LlmConfig, OAuthProviderConfig, OAuthProxyConfig, ServerConfig,
    SyncConfig,
};
