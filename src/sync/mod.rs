// ABOUTME: Offline mutation queue and its replay engine
// ABOUTME: Mutations are recorded locally first and replayed in order once online
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Sync
//!
//! Every user action taken while offline (or before the backend confirms it)
//! becomes a [`QueueItem`](coach_core::models::QueueItem) in [`SyncQueue`].
//! [`SyncEngine::flush`] replays the queue against the backend:
//!
//! - `create` upserts on `id`, and the queue writes its idempotency key into
//!   the payload, so replaying the same item twice leaves one row
//! - `update` and `delete` target `payload.id`
//! - the backend row ends up as the last replayed mutation left it; the
//!   item's `client_updated_at` is local metadata and payloads carry only
//!   entity columns
//! - a flush from the app context replays only the signed-in user's items,
//!   since the backend accepts writes under that user's token alone

/// Replay engine
pub mod engine;
/// Persistent queue
pub mod queue;

pub use engine::{FlushReport, SyncEngine};
pub use queue::SyncQueue;
