// ABOUTME: Utility modules shared by the HTTP clients and route handlers
// ABOUTME: HTTP client construction with per-purpose timeouts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// HTTP client construction with per-purpose timeouts
pub mod http_client;
