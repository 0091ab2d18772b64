// ABOUTME: Sync queue replay policy defaults
// ABOUTME: Attempt limits and exponential backoff bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Attempts before a retryable failure is moved to the dead letter state
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// First retry delay in seconds
pub const DEFAULT_BASE_BACKOFF_SECS: u64 = 5;

/// Upper bound for the retry delay in seconds (1 hour)
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 3_600;

/// Maximum items replayed in one flush
pub const DEFAULT_FLUSH_BATCH: i64 = 200;
