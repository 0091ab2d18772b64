// ABOUTME: Offline-aware supplement checklist for the current day
// ABOUTME: Loads assigned supplements with today's intake logs and queues new intakes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{load_daily, updated_snapshot, DailyData, OfflineSnapshot};
use crate::backend::{select_as, Direction, Query};
use crate::cache::CacheKey;
use crate::context::AppContext;
use crate::errors::AppResult;
use chrono::{DateTime, NaiveDate, Utc};
use coach_core::constants::tables;
use coach_core::models::{EntityType, NewQueueItem, QueueAction, Supplement, SupplementLog};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A supplement with today's intake state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplementStatus {
    /// Supplement
    pub supplement: Supplement,
    /// Logged today
    pub taken: bool,
    /// Time of today's intake
    pub taken_at: Option<DateTime<Utc>>,
}

/// Today's supplement checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplementsToday {
    /// Day the data was fetched for
    pub date: NaiveDate,
    /// Active supplements
    pub supplements: Vec<Supplement>,
    /// Intake logs
    pub logs: Vec<SupplementLog>,
    /// Derived checklist, ordered by scheduled time
    pub items: Vec<SupplementStatus>,
    /// Supplements taken today
    pub taken_count: usize,
    /// Supplements still due today
    pub pending_count: usize,
}

impl SupplementsToday {
    fn new(date: NaiveDate, supplements: Vec<Supplement>, logs: Vec<SupplementLog>) -> Self {
        let mut today = Self {
            date,
            supplements,
            logs,
            items: Vec::new(),
            taken_count: 0,
            pending_count: 0,
        };
        today.refresh_for(date);
        today
    }
}

impl DailyData for SupplementsToday {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn refresh_for(&mut self, today: NaiveDate) {
        self.items = self
            .supplements
            .iter()
            .filter(|s| s.is_active)
            .map(|supplement| {
                let taken_at = self
                    .logs
                    .iter()
                    .filter(|log| log.supplement_id == supplement.id && log.date == today)
                    .map(|log| log.taken_at)
                    .min();
                SupplementStatus {
                    supplement: supplement.clone(),
                    taken: taken_at.is_some(),
                    taken_at,
                }
            })
            .collect();
        self.items
            .sort_by_key(|item| (item.supplement.scheduled_time.is_none(), item.supplement.scheduled_time));
        self.taken_count = self.items.iter().filter(|item| item.taken).count();
        self.pending_count = self.items.len() - self.taken_count;
    }
}

/// Supplement checklist service
pub struct OfflineSupplements<'a> {
    ctx: &'a AppContext,
}

impl<'a> OfflineSupplements<'a> {
    /// Service over `ctx`
    #[must_use]
    pub const fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Today's checklist for the signed-in athlete
    ///
    /// # Errors
    ///
    /// Returns an error only when nobody is signed in; load failures are
    /// reported through the snapshot
    pub async fn load(&self) -> AppResult<OfflineSnapshot<SupplementsToday>> {
        let user_id = self.ctx.require_user().await?;
        let key = CacheKey::TodaySupplements { user_id };
        Ok(load_daily(self.ctx, &key, "supplements", self.fetch(user_id)).await)
    }

    async fn fetch(&self, user_id: Uuid) -> AppResult<SupplementsToday> {
        let today = self.ctx.clock.today();
        let supplements: Vec<Supplement> = select_as(
            self.ctx.backend.as_ref(),
            &Query::table(tables::ATHLETE_SUPPLEMENTS)
                .eq("user_id", user_id)
                .eq("is_active", true)
                .order("scheduled_time", Direction::Asc),
        )
        .await?;
        let logs: Vec<SupplementLog> = select_as(
            self.ctx.backend.as_ref(),
            &Query::table(tables::SUPPLEMENT_LOGS)
                .eq("user_id", user_id)
                .eq("date", today),
        )
        .await?;
        Ok(SupplementsToday::new(today, supplements, logs))
    }

    /// Record that `supplement_id` was taken now
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the intake cannot be queued
    pub async fn queue_supplement_log(&self, supplement_id: Uuid) -> AppResult<SupplementLog> {
        let user_id = self.ctx.require_user().await?;
        let log = SupplementLog {
            id: Uuid::new_v4(),
            user_id,
            supplement_id,
            date: self.ctx.clock.today(),
            taken_at: self.ctx.clock.now_utc(),
        };
        let key = CacheKey::TodaySupplements { user_id };
        let snapshot = updated_snapshot(self.ctx, &key, |today: &mut SupplementsToday| {
            today.logs.push(log.clone());
        })
        .await?;

        self.ctx
            .enqueue_optimistic(
                NewQueueItem::new(
                    EntityType::SupplementLog,
                    QueueAction::Create,
                    user_id,
                    serde_json::to_value(&log)?,
                ),
                &key,
                snapshot.as_ref(),
            )
            .await?;
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn supplement(name: &str, hour: Option<u32>) -> Supplement {
        Supplement {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_owned(),
            dosage: None,
            scheduled_time: hour.and_then(|h| NaiveTime::from_hms_opt(h, 0, 0)),
            is_active: true,
        }
    }

    #[test]
    fn test_logs_from_another_day_do_not_count() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default();
        let creatine = supplement("Creatine", Some(8));
        let log = SupplementLog {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            supplement_id: creatine.id,
            date: day,
            taken_at: Utc::now(),
        };
        let mut today = SupplementsToday::new(day, vec![creatine, supplement("Zinc", None)], vec![log]);
        assert_eq!(today.taken_count, 1);
        assert_eq!(today.items[0].supplement.name, "Creatine");

        today.refresh_for(day.succ_opt().unwrap_or(day));
        assert_eq!(today.taken_count, 0);
        assert_eq!(today.pending_count, 2);
    }
}
