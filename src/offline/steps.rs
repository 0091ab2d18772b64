// ABOUTME: Offline-aware daily step count with goal progress
// ABOUTME: Creates today's step entry on first log and updates it afterwards
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{load_daily, updated_snapshot, DailyData, OfflineSnapshot};
use crate::backend::{select_one, Query};
use crate::cache::CacheKey;
use crate::context::AppContext;
use crate::errors::AppResult;
use chrono::NaiveDate;
use coach_core::constants::goals::DEFAULT_STEP_GOAL;
use coach_core::constants::tables;
use coach_core::models::{EntityType, NewQueueItem, QueueAction, StepEntry};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Today's steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepsToday {
    /// Day the data was fetched for
    pub date: NaiveDate,
    /// Stored entry, absent until the first log of the day
    pub entry: Option<StepEntry>,
    /// Steps counted today
    pub steps: u32,
    /// Daily goal
    pub goal: u32,
    /// Progress towards the goal, 0-100
    pub progress_percent: f64,
}

impl StepsToday {
    fn new(date: NaiveDate, entry: Option<StepEntry>) -> Self {
        let mut today = Self {
            date,
            entry,
            steps: 0,
            goal: DEFAULT_STEP_GOAL,
            progress_percent: 0.0,
        };
        today.refresh_for(date);
        today
    }
}

impl DailyData for StepsToday {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn refresh_for(&mut self, today: NaiveDate) {
        let current = self.entry.as_ref().filter(|entry| entry.date == today);
        self.steps = current.map_or(0, |entry| entry.steps);
        self.goal = self
            .entry
            .as_ref()
            .and_then(|entry| entry.goal)
            .filter(|goal| *goal > 0)
            .unwrap_or(DEFAULT_STEP_GOAL);
        self.progress_percent = (f64::from(self.steps) / f64::from(self.goal) * 100.0).min(100.0);
    }
}

/// Step tracking service
pub struct OfflineSteps<'a> {
    ctx: &'a AppContext,
}

impl<'a> OfflineSteps<'a> {
    /// Service over `ctx`
    #[must_use]
    pub const fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Today's steps for the signed-in athlete
    ///
    /// # Errors
    ///
    /// Returns an error only when nobody is signed in
    pub async fn load(&self) -> AppResult<OfflineSnapshot<StepsToday>> {
        let user_id = self.ctx.require_user().await?;
        let key = CacheKey::TodaySteps { user_id };
        Ok(load_daily(self.ctx, &key, "step counts", self.fetch(user_id)).await)
    }

    async fn fetch(&self, user_id: Uuid) -> AppResult<StepsToday> {
        let today = self.ctx.clock.today();
        let entry: Option<StepEntry> = select_one(
            self.ctx.backend.as_ref(),
            &Query::table(tables::STEP_ENTRIES)
                .eq("user_id", user_id)
                .eq("date", today),
        )
        .await?;
        Ok(StepsToday::new(today, entry))
    }

    /// Set today's step count, creating the entry on first use
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the change cannot be queued
    pub async fn queue_step_log(&self, steps: u32) -> AppResult<StepEntry> {
        let user_id = self.ctx.require_user().await?;
        let today = self.ctx.clock.today();
        let key = CacheKey::TodaySteps { user_id };

        let existing = self
            .ctx
            .cache
            .get::<StepsToday>(&key)
            .await
            .and_then(|cached| cached.entry)
            .filter(|entry| entry.date == today && entry.user_id == user_id);

        let (entry, action, payload) = match existing {
            Some(entry) => {
                let entry = StepEntry { steps, ..entry };
                let payload = json!({ "id": entry.id, "steps": steps });
                (entry, QueueAction::Update, payload)
            }
            None => {
                let entry = StepEntry {
                    id: Uuid::new_v4(),
                    user_id,
                    date: today,
                    steps,
                    goal: None,
                };
                let payload = serde_json::to_value(&entry)?;
                (entry, QueueAction::Create, payload)
            }
        };

        let snapshot = match updated_snapshot(self.ctx, &key, |cached: &mut StepsToday| {
            cached.entry = Some(entry.clone());
        })
        .await?
        {
            Some(snapshot) => snapshot,
            None => serde_json::to_value(StepsToday::new(today, Some(entry.clone())))?,
        };
        self.ctx
            .enqueue_optimistic(
                NewQueueItem::new(EntityType::StepLog, action, user_id, payload),
                &key,
                Some(&snapshot),
            )
            .await?;
        Ok(entry)
    }
}
