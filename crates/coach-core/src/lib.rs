// ABOUTME: Core types and constants for the Pierre coaching data layer
// ABOUTME: Foundation crate with error taxonomy, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Coach Core
//!
//! Foundation crate shared by the offline data layer, the intelligence crate,
//! and the token-exchange proxy. It changes rarely, which keeps incremental
//! builds of the workspace fast.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the retryable/fatal split
//! - **constants**: table names, cache prefixes, sync policy, timeouts, units
//! - **models**: rows of the hosted relational store and sync queue records

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Domain models (meals, supplements, workouts, tracking, sync queue)
pub mod models;
