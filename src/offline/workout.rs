// ABOUTME: Offline-aware view of the active workout program and today's training
// ABOUTME: Derives today's workout or rest day from the weekly schedule and queues sessions and sets
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{load_daily, updated_snapshot, DailyData, OfflineSnapshot};
use crate::backend::{select_as, select_one, Direction, Query};
use crate::cache::CacheKey;
use crate::context::AppContext;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use coach_core::constants::tables;
use coach_core::models::{
    EntityType, NewQueueItem, QueueAction, Workout, WorkoutProgram, WorkoutSession, WorkoutSet,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Today's training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutToday {
    /// Day the data was fetched for
    pub date: NaiveDate,
    /// Active program
    pub program: Option<WorkoutProgram>,
    /// Workout scheduled for today's weekday
    pub today_workout: Option<Workout>,
    /// A program is active and schedules nothing today
    pub is_rest_day: bool,
    /// Sessions logged
    pub sessions: Vec<WorkoutSession>,
    /// A session was completed today
    pub completed_today: bool,
}

impl WorkoutToday {
    fn new(date: NaiveDate, program: Option<WorkoutProgram>, sessions: Vec<WorkoutSession>) -> Self {
        let mut today = Self {
            date,
            program,
            today_workout: None,
            is_rest_day: false,
            sessions,
            completed_today: false,
        };
        today.refresh_for(date);
        today
    }
}

impl DailyData for WorkoutToday {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn refresh_for(&mut self, today: NaiveDate) {
        self.today_workout = self
            .program
            .as_ref()
            .and_then(|program| program.workout_for(today))
            .cloned();
        self.is_rest_day = self.program.is_some() && self.today_workout.is_none();
        self.completed_today = self
            .sessions
            .iter()
            .any(|session| session.date == today && session.completed_at.is_some());
    }
}

/// Set to record within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkoutSet {
    /// Owning session
    pub session_id: Uuid,
    /// Exercise name
    pub exercise_name: String,
    /// 1-based set index
    pub set_number: u32,
    /// Repetitions completed
    pub reps: u32,
    /// Load in kilograms
    pub weight_kg: Option<f64>,
}

/// Workout program service
pub struct OfflineWorkout<'a> {
    ctx: &'a AppContext,
}

impl<'a> OfflineWorkout<'a> {
    /// Service over `ctx`
    #[must_use]
    pub const fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Active program and today's sessions for the signed-in athlete
    ///
    /// # Errors
    ///
    /// Returns an error only when nobody is signed in
    pub async fn load(&self) -> AppResult<OfflineSnapshot<WorkoutToday>> {
        let user_id = self.ctx.require_user().await?;
        let key = CacheKey::WorkoutProgram { user_id };
        Ok(load_daily(self.ctx, &key, "workouts", self.fetch(user_id)).await)
    }

    async fn fetch(&self, user_id: Uuid) -> AppResult<WorkoutToday> {
        let today = self.ctx.clock.today();
        let program: Option<WorkoutProgram> = select_one(
            self.ctx.backend.as_ref(),
            &Query::table(tables::WORKOUT_PROGRAMS)
                .eq("user_id", user_id)
                .eq("is_active", true),
        )
        .await?;
        let sessions: Vec<WorkoutSession> = select_as(
            self.ctx.backend.as_ref(),
            &Query::table(tables::WORKOUT_SESSIONS)
                .eq("user_id", user_id)
                .eq("date", today)
                .order("started_at", Direction::Asc),
        )
        .await?;
        Ok(WorkoutToday::new(today, program, sessions))
    }

    /// Record a workout session
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the session cannot be queued
    pub async fn queue_workout_session(
        &self,
        workout_name: &str,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<WorkoutSession> {
        let user_id = self.ctx.require_user().await?;
        let key = CacheKey::WorkoutProgram { user_id };
        let cached = self.ctx.cache.get::<WorkoutToday>(&key).await;
        let session = WorkoutSession {
            id: Uuid::new_v4(),
            user_id,
            program_id: cached.and_then(|today| today.program.map(|program| program.id)),
            workout_name: workout_name.to_owned(),
            date: self.ctx.clock.today(),
            started_at,
            completed_at,
        };

        let snapshot = updated_snapshot(self.ctx, &key, |today: &mut WorkoutToday| {
            today.sessions.push(session.clone());
        })
        .await?;
        self.ctx
            .enqueue_optimistic(
                NewQueueItem::new(
                    EntityType::WorkoutSession,
                    QueueAction::Create,
                    user_id,
                    serde_json::to_value(&session)?,
                ),
                &key,
                snapshot.as_ref(),
            )
            .await?;
        Ok(session)
    }

    /// Record a set within a session
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, the set is empty, or it cannot be queued
    pub async fn queue_workout_set(&self, set: NewWorkoutSet) -> AppResult<WorkoutSet> {
        let user_id = self.ctx.require_user().await?;
        if set.set_number == 0 {
            return Err(AppError::invalid_input("set_number is 1-based"));
        }
        let set = WorkoutSet {
            id: Uuid::new_v4(),
            session_id: set.session_id,
            user_id,
            exercise_name: set.exercise_name,
            set_number: set.set_number,
            reps: set.reps,
            weight_kg: set.weight_kg,
            completed_at: self.ctx.clock.now_utc(),
        };
        self.ctx
            .enqueue_optimistic(
                NewQueueItem::new(
                    EntityType::WorkoutSet,
                    QueueAction::Create,
                    user_id,
                    serde_json::to_value(&set)?,
                ),
                &CacheKey::WorkoutProgram { user_id },
                None,
            )
            .await?;
        Ok(set)
    }
}
