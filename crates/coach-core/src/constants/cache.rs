// ABOUTME: Cache-related constants for capacity and key namespacing
// ABOUTME: Shared by the persistent SQLite cache and the in-memory session cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default maximum entries for the in-memory session cache
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 2_000;

/// Prefix shared by every user-scoped cache key
pub const USER_KEY_PREFIX: &str = "user:";

/// Prefix for exercise catalog pages
pub const EXERCISE_CATALOG_PREFIX: &str = "exercises:catalog";

/// Prefix for food search results
pub const FOOD_SEARCH_PREFIX: &str = "food:search";
