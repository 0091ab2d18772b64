// ABOUTME: Sync queue record types for offline mutations awaiting replay
// ABOUTME: Each item carries an idempotency key, a replay sequence, and retry bookkeeping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::tables;
use crate::errors::AppError;

/// Kind of entity a queued mutation touches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Supplement intake log
    SupplementLog,
    /// Consumed-meal log
    MealLog,
    /// Daily step entry
    StepLog,
    /// Workout session
    WorkoutSession,
    /// Set within a workout session
    WorkoutSet,
}

impl EntityType {
    /// Stable string form stored locally
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SupplementLog => "supplement_log",
            Self::MealLog => "meal_log",
            Self::StepLog => "step_log",
            Self::WorkoutSession => "workout_session",
            Self::WorkoutSet => "workout_set",
        }
    }

    /// Backend table the mutation is replayed against
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::SupplementLog => tables::SUPPLEMENT_LOGS,
            Self::MealLog => tables::MEAL_LOGS,
            Self::StepLog => tables::STEP_ENTRIES,
            Self::WorkoutSession => tables::WORKOUT_SESSIONS,
            Self::WorkoutSet => tables::WORKOUT_SETS,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supplement_log" => Ok(Self::SupplementLog),
            "meal_log" => Ok(Self::MealLog),
            "step_log" => Ok(Self::StepLog),
            "workout_session" => Ok(Self::WorkoutSession),
            "workout_set" => Ok(Self::WorkoutSet),
            other => Err(AppError::invalid_input(format!("Unknown entity type: {other}"))),
        }
    }
}

/// Mutation kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QueueAction {
    /// Insert a new row
    Create,
    /// Modify an existing row
    Update,
    /// Remove a row
    Delete,
}

impl QueueAction {
    /// Stable string form stored locally
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for QueueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(AppError::invalid_input(format!("Unknown queue action: {other}"))),
        }
    }
}

/// Replay state of a queue item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    /// Waiting for replay
    Pending,
    /// Dead letter: fatal error or attempts exhausted
    Failed,
}

impl QueueStatus {
    /// Stable string form stored locally
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for QueueStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            other => Err(AppError::invalid_input(format!("Unknown queue status: {other}"))),
        }
    }
}

/// Mutation to append to the queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewQueueItem {
    /// Entity kind
    pub entity: EntityType,
    /// Mutation kind
    pub action: QueueAction,
    /// Owning user
    pub user_id: Uuid,
    /// Row payload; updates and deletes must carry the row `id`
    pub payload: Value,
}

impl NewQueueItem {
    /// Build a queue item
    #[must_use]
    pub const fn new(entity: EntityType, action: QueueAction, user_id: Uuid, payload: Value) -> Self {
        Self {
            entity,
            action,
            user_id,
            payload,
        }
    }
}

/// Stored queue item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueItem {
    /// Idempotency key; written as the row id on create
    pub id: Uuid,
    /// Replay order, strictly increasing
    pub seq: i64,
    /// Entity kind
    pub entity: EntityType,
    /// Mutation kind
    pub action: QueueAction,
    /// Owning user
    pub user_id: Uuid,
    /// Row payload
    pub payload: Value,
    /// When the mutation was recorded
    pub enqueued_at: DateTime<Utc>,
    /// Failed replay attempts so far
    pub attempts: u32,
    /// Last replay error message
    pub last_error: Option<String>,
    /// Earliest time of the next replay attempt
    pub next_attempt_at: Option<DateTime<Utc>>,
    /// Replay state
    pub status: QueueStatus,
}

impl QueueItem {
    /// Row id the mutation targets (`payload.id`)
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        self.payload.get("id").and_then(Value::as_str)
    }

    /// When the user made the change; queue metadata, never sent as a column
    #[must_use]
    pub const fn client_updated_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }
}
