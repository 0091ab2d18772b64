// ABOUTME: Timeouts for outbound HTTP calls
// ABOUTME: LLM generation is slow; food search must stay responsive
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Program generation request timeout (5 minutes)
pub const LLM_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Open Food Facts search timeout
pub const OPEN_FOOD_FACTS_TIMEOUT_SECS: u64 = 8;

/// OAuth token endpoint request timeout
pub const OAUTH_REQUEST_TIMEOUT_SECS: u64 = 15;

/// OAuth connect timeout
pub const OAUTH_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Backend request timeout
pub const BACKEND_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout for other API clients
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
