// ABOUTME: Snapshot of one athlete day used as input to the reminder rules
// ABOUTME: Always fetched fresh from the backend so reminders never fire on stale cache data
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::backend::{select_as, select_one, BackendClient, Direction, Query};
use crate::errors::AppResult;
use crate::offline::nutrition::meals_for_day_type;
use chrono::NaiveDate;
use coach_core::constants::tables;
use coach_core::models::{
    CheckIn, DayTypeAssignment, Meal, MealLog, StepEntry, Supplement, SupplementLog, WaterEntry,
    WorkoutProgram, WorkoutSession,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

/// Everything the reminder rules look at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReminderSnapshot {
    /// Local day
    pub date: NaiveDate,
    /// Active program
    pub program: Option<WorkoutProgram>,
    /// Sessions logged today
    pub sessions: Vec<WorkoutSession>,
    /// Active supplements
    pub supplements: Vec<Supplement>,
    /// Supplement logs of today
    pub supplement_logs: Vec<SupplementLog>,
    /// Meals planned for today's day type
    pub meals: Vec<Meal>,
    /// Meal logs of today
    pub meal_logs: Vec<MealLog>,
    /// Today's water entry
    pub water: Option<WaterEntry>,
    /// Today's step entry
    pub steps: Option<StepEntry>,
    /// Most recent check-in
    pub last_check_in: Option<CheckIn>,
}

impl ReminderSnapshot {
    /// Load the snapshot of `date` for `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if any backend read fails
    #[instrument(skip(backend))]
    pub async fn fetch(
        backend: &dyn BackendClient,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Self> {
        let today = |table: &str| Query::table(table).eq("user_id", user_id).eq("date", date);

        let program = select_one(
            backend,
            &Query::table(tables::WORKOUT_PROGRAMS)
                .eq("user_id", user_id)
                .eq("is_active", true),
        )
        .await?;
        let sessions = select_as(backend, &today(tables::WORKOUT_SESSIONS)).await?;
        let supplements = select_as(
            backend,
            &Query::table(tables::ATHLETE_SUPPLEMENTS)
                .eq("user_id", user_id)
                .eq("is_active", true),
        )
        .await?;
        let supplement_logs = select_as(backend, &today(tables::SUPPLEMENT_LOGS)).await?;

        let day_type: Option<DayTypeAssignment> =
            select_one(backend, &today(tables::DAY_TYPE_ASSIGNMENTS)).await?;
        let meals: Vec<Meal> = select_as(
            backend,
            &Query::table(tables::MEALS)
                .eq("user_id", user_id)
                .order("scheduled_time", Direction::Asc),
        )
        .await?;
        let meals = meals_for_day_type(
            meals,
            day_type.as_ref().map(|assignment| assignment.day_type.as_str()),
        );
        let meal_logs = select_as(backend, &today(tables::MEAL_LOGS)).await?;

        let water = select_one(backend, &today(tables::WATER_TRACKING)).await?;
        let steps = select_one(backend, &today(tables::STEP_ENTRIES)).await?;
        let last_check_in = select_one(
            backend,
            &Query::table(tables::CHECK_INS)
                .eq("user_id", user_id)
                .order("date", Direction::Desc),
        )
        .await?;

        Ok(Self {
            date,
            program,
            sessions,
            supplements,
            supplement_logs,
            meals,
            meal_logs,
            water,
            steps,
            last_check_in,
        })
    }
}
