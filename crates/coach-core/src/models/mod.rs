// ABOUTME: Domain models mirroring the hosted relational store tables
// ABOUTME: Plain serde rows plus the local sync queue record types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Food items, meals, recipes, and nutrition totals
pub mod nutrition;
/// Sync queue records
pub mod sync;
/// Supplements, steps, water, and check-ins
pub mod tracking;
/// Workout programs, sessions, sets, and exercises
pub mod workout;

pub use nutrition::{
    DayTypeAssignment, FoodItem, FoodSource, FoodUnit, Meal, MealFoodItem, MealLog, MealType,
    NutritionTotals, Recipe, RecipeIngredient,
};
pub use sync::{EntityType, NewQueueItem, QueueAction, QueueItem, QueueStatus};
pub use tracking::{CheckIn, StepEntry, Supplement, SupplementLog, WaterEntry};
pub use workout::{
    DayOfWeek, Exercise, PlannedExercise, ScheduledDay, Workout, WorkoutProgram, WorkoutSession,
    WorkoutSet,
};
