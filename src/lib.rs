// ABOUTME: Main library entry point for the Pierre coaching data layer
// ABOUTME: Offline cache, sync queue, reminders, external food/exercise APIs, and the OAuth token proxy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Pierre Coach
//!
//! Data layer of the Pierre coaching app. Screens read "today" data through
//! offline services that fall back to a local cache, and writes made while
//! offline go through a durable sync queue that is replayed against the
//! backend once connectivity returns.
//!
//! ## Architecture
//!
//! - **Cache**: `SQLite`-backed key/value store for offline reads
//! - **Sync**: durable queue of pending writes plus the engine that replays it
//! - **Offline**: per-screen services returning [`offline::OfflineSnapshot`]s
//! - **Reminders**: rule set turning a day's data into prioritized reminders
//! - **External**: Open Food Facts, USDA `FoodData Central`, and `HeyGainz` clients
//! - **LLM**: `OpenRouter` workout program generation
//! - **Routes**: the token exchange proxy for wearable OAuth providers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_coach::backend::InMemoryBackend;
//! use pierre_coach::context::AppContext;
//! use pierre_coach::database::LocalDatabase;
//! use pierre_coach::errors::AppResult;
//! use pierre_coach::offline::OfflineSupplements;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let database = LocalDatabase::new("sqlite::memory:").await?;
//!     let ctx = AppContext::new(Arc::new(InMemoryBackend::new()), &database);
//!     ctx.sign_in(uuid::Uuid::new_v4(), "token").await;
//!
//!     let today = OfflineSupplements::new(&ctx).load().await?;
//!     println!("from cache: {}", today.is_from_cache);
//!     Ok(())
//! }
//! ```

/// Backend data API abstraction (`PostgREST` style)
pub mod backend;

/// Offline key/value cache
pub mod cache;

/// Environment configuration
pub mod config;

/// Online/offline state and pending write count
pub mod connectivity;

/// Application constants
pub mod constants;

/// Session store and shared application context
pub mod context;

/// Local `SQLite` database
pub mod database;

/// Local calendar date helpers and injectable clocks
pub mod dates;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// External food and exercise API clients
pub mod external;

/// LLM provider abstraction and workout program generation
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware for the token exchange proxy
pub mod middleware;

/// Token exchange against wearable OAuth providers
pub mod oauth2_client;

/// Offline-first services behind the "today" screens
pub mod offline;

/// Reminder generation
pub mod reminders;

/// Token exchange proxy routes
pub mod routes;

/// Durable write queue and replay engine
pub mod sync;

/// Shared utilities
pub mod utils;

pub use coach_core::models;
pub use coach_intelligence as intelligence;
