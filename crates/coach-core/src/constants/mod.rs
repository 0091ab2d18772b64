// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for cache keys, sync policy, backend tables, and units
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped by domain rather than kept in a single large file.

/// Local cache constants (capacities, key prefixes)
pub mod cache;
/// Default daily targets
pub mod goals;
/// Backend table names
pub mod tables;
/// Sync queue replay policy defaults
pub mod sync;
/// Timeouts for outbound HTTP calls
pub mod timeouts;
/// Unit conversion constants
pub mod units;

/// Service names used in structured logging
pub mod service_names {
    /// Token exchange proxy service name
    pub const COACH_TOKEN_PROXY: &str = "coach-token-proxy";
    /// CLI service name
    pub const COACH_CLI: &str = "coach-cli";
}
