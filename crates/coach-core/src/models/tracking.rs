// ABOUTME: Daily tracking models for supplements, steps, water intake, and check-ins
// ABOUTME: Rows of athlete_supplements, supplement_logs, step_entries, water_tracking, check_ins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const fn default_true() -> bool {
    true
}

/// Supplement assigned to an athlete
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplement {
    /// Row id
    pub id: Uuid,
    /// Athlete
    pub user_id: Uuid,
    /// Supplement name
    pub name: String,
    /// Dosage, e.g. "5 g"
    #[serde(default)]
    pub dosage: Option<String>,
    /// Local time it should be taken
    #[serde(default)]
    pub scheduled_time: Option<NaiveTime>,
    /// Inactive supplements are ignored
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Record of a supplement being taken
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplementLog {
    /// Row id
    pub id: Uuid,
    /// Athlete
    pub user_id: Uuid,
    /// Supplement taken
    pub supplement_id: Uuid,
    /// Local calendar date
    pub date: NaiveDate,
    /// When it was taken
    pub taken_at: DateTime<Utc>,
}

/// Daily step count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepEntry {
    /// Row id
    pub id: Uuid,
    /// Athlete
    pub user_id: Uuid,
    /// Local calendar date
    pub date: NaiveDate,
    /// Steps counted so far
    pub steps: u32,
    /// Daily goal
    #[serde(default)]
    pub goal: Option<u32>,
}

/// Daily water intake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterEntry {
    /// Row id
    pub id: Uuid,
    /// Athlete
    pub user_id: Uuid,
    /// Local calendar date
    pub date: NaiveDate,
    /// Water consumed so far (ml)
    pub amount_ml: u32,
    /// Daily goal (ml)
    #[serde(default)]
    pub goal_ml: Option<u32>,
}

/// Periodic athlete check-in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckIn {
    /// Row id
    pub id: Uuid,
    /// Athlete
    pub user_id: Uuid,
    /// Local calendar date
    pub date: NaiveDate,
    /// Body weight at check-in
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Notes for the coach
    #[serde(default)]
    pub notes: Option<String>,
}
