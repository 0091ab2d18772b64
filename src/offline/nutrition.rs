// ABOUTME: Offline-aware meal plan for the current day with computed nutrition totals
// ABOUTME: Selects meals by the day type assigned to today and queues meal logs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{load_daily, updated_snapshot, DailyData, OfflineSnapshot};
use crate::backend::{select_as, select_one, Direction, Query};
use crate::cache::CacheKey;
use crate::context::AppContext;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use coach_core::constants::tables;
use coach_core::models::{
    DayTypeAssignment, EntityType, Meal, MealLog, NewQueueItem, NutritionTotals, QueueAction,
};
use coach_intelligence::{macro_split, meal_totals, MacroSplit};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Columns selecting a meal with its food items embedded
const MEAL_COLUMNS: &str = "*, meal_food_items(*, food_item:food_items(*))";

/// A meal with its computed totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealWithTotals {
    /// Planned meal
    pub meal: Meal,
    /// Nutrition of every food item in the meal
    pub totals: NutritionTotals,
    /// Meal logged as eaten today
    pub logged: bool,
}

/// Today's meal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionToday {
    /// Day the data was fetched for
    pub date: NaiveDate,
    /// Day type assigned to the day, e.g. "Training Day"
    pub day_type: Option<String>,
    /// Meals ordered by scheduled time
    pub meals: Vec<MealWithTotals>,
    /// Meal logs
    pub logs: Vec<MealLog>,
    /// Sum over every planned meal
    pub planned_totals: NutritionTotals,
    /// Sum over meals logged today
    pub consumed_totals: NutritionTotals,
    /// Calorie split of the plan
    pub macro_split: MacroSplit,
}

impl NutritionToday {
    fn new(date: NaiveDate, day_type: Option<String>, meals: Vec<Meal>, logs: Vec<MealLog>) -> Self {
        let mut today = Self {
            date,
            day_type,
            meals: meals
                .into_iter()
                .map(|meal| MealWithTotals {
                    meal,
                    totals: NutritionTotals::default(),
                    logged: false,
                })
                .collect(),
            logs,
            planned_totals: NutritionTotals::default(),
            consumed_totals: NutritionTotals::default(),
            macro_split: MacroSplit::default(),
        };
        today.refresh_for(date);
        today
    }
}

impl DailyData for NutritionToday {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn refresh_for(&mut self, today: NaiveDate) {
        for entry in &mut self.meals {
            entry.totals = meal_totals(&entry.meal).unwrap_or_else(|e| {
                warn!(meal = %entry.meal.name, error = %e, "Meal totals unavailable");
                NutritionTotals::default()
            });
            entry.logged = self
                .logs
                .iter()
                .any(|log| log.meal_id == entry.meal.id && log.date == today);
        }
        self.meals
            .sort_by_key(|entry| (entry.meal.scheduled_time.is_none(), entry.meal.scheduled_time));
        self.planned_totals = self.meals.iter().map(|entry| entry.totals).sum();
        self.consumed_totals = self
            .meals
            .iter()
            .filter(|entry| entry.logged)
            .map(|entry| entry.totals)
            .sum();
        self.macro_split = macro_split(&self.planned_totals);
    }
}

/// Keep meals of `day_type`; meals without a day type apply every day
pub(crate) fn meals_for_day_type(meals: Vec<Meal>, day_type: Option<&str>) -> Vec<Meal> {
    match day_type {
        Some(day_type) => meals
            .into_iter()
            .filter(|meal| meal.day_type.as_deref().is_none_or(|t| t == day_type))
            .collect(),
        None => meals,
    }
}

/// Meal plan service
pub struct OfflineNutrition<'a> {
    ctx: &'a AppContext,
}

impl<'a> OfflineNutrition<'a> {
    /// Service over `ctx`
    #[must_use]
    pub const fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Today's meals and totals for the signed-in athlete
    ///
    /// # Errors
    ///
    /// Returns an error only when nobody is signed in
    pub async fn load(&self) -> AppResult<OfflineSnapshot<NutritionToday>> {
        let user_id = self.ctx.require_user().await?;
        let key = CacheKey::TodayNutrition { user_id };
        Ok(load_daily(self.ctx, &key, "meals", self.fetch(user_id)).await)
    }

    async fn fetch(&self, user_id: Uuid) -> AppResult<NutritionToday> {
        let today = self.ctx.clock.today();
        let backend = self.ctx.backend.as_ref();

        let assignment: Option<DayTypeAssignment> = select_one(
            backend,
            &Query::table(tables::DAY_TYPE_ASSIGNMENTS)
                .eq("user_id", user_id)
                .eq("date", today),
        )
        .await?;
        let day_type = assignment.map(|a| a.day_type);

        let meals: Vec<Meal> = select_as(
            backend,
            &Query::table(tables::MEALS)
                .select(MEAL_COLUMNS)
                .eq("user_id", user_id)
                .order("scheduled_time", Direction::Asc),
        )
        .await?;
        let logs: Vec<MealLog> = select_as(
            backend,
            &Query::table(tables::MEAL_LOGS)
                .eq("user_id", user_id)
                .eq("date", today),
        )
        .await?;

        let meals = meals_for_day_type(meals, day_type.as_deref());
        Ok(NutritionToday::new(today, day_type, meals, logs))
    }

    /// Log `meal_id` as eaten now
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, the meal is not in today's
    /// cached plan, or the log cannot be queued
    pub async fn queue_meal_log(&self, meal_id: Uuid) -> AppResult<MealLog> {
        let user_id = self.ctx.require_user().await?;
        let key = CacheKey::TodayNutrition { user_id };

        if let Some(today) = self.ctx.cache.get::<NutritionToday>(&key).await {
            if !today.meals.iter().any(|entry| entry.meal.id == meal_id) {
                return Err(AppError::not_found(format!("Meal {meal_id}")));
            }
        }

        let log = MealLog {
            id: Uuid::new_v4(),
            user_id,
            meal_id,
            date: self.ctx.clock.today(),
            logged_at: self.ctx.clock.now_utc(),
        };
        let snapshot = updated_snapshot(self.ctx, &key, |today: &mut NutritionToday| {
            today.logs.push(log.clone());
        })
        .await?;
        self.ctx
            .enqueue_optimistic(
                NewQueueItem::new(
                    EntityType::MealLog,
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
    use coach_core::models::{FoodItem, FoodUnit, MealFoodItem, MealType};

    fn meal(name: &str, day_type: Option<&str>, grams: f64) -> Meal {
        let id = Uuid::new_v4();
        Meal {
            id,
            user_id: Uuid::nil(),
            name: name.to_owned(),
            day_type: day_type.map(str::to_owned),
            meal_type: MealType::Lunch,
            scheduled_time: None,
            food_items: vec![MealFoodItem {
                id: Uuid::new_v4(),
                meal_id: id,
                food_item: FoodItem::new("Rice", 130.0, 2.7, 28.0, 0.3),
                quantity: grams,
                unit: FoodUnit::Grams,
            }],
        }
    }

    #[test]
    fn test_day_type_filter_keeps_untyped_meals() {
        let meals = vec![
            meal("Rest lunch", Some("Rest Day"), 100.0),
            meal("Training lunch", Some("Training Day"), 100.0),
            meal("Shake", None, 100.0),
        ];
        let kept = meals_for_day_type(meals, Some("Training Day"));
        let names: Vec<&str> = kept.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Training lunch", "Shake"]);
    }

    #[test]
    fn test_consumed_totals_follow_logs() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default();
        let lunch = meal("Lunch", None, 200.0);
        let log = MealLog {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            meal_id: lunch.id,
            date: day,
            logged_at: chrono::Utc::now(),
        };
        let today = NutritionToday::new(day, None, vec![lunch, meal("Dinner", None, 100.0)], vec![log]);
        assert!((today.planned_totals.calories - 390.0).abs() < 1e-9);
        assert!((today.consumed_totals.calories - 260.0).abs() < 1e-9);
    }
}
