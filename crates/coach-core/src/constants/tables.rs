// ABOUTME: Backend table names consumed as given by the hosted relational store
// ABOUTME: Single source of truth for PostgREST resource paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Meal definitions per user and day type
pub const MEALS: &str = "meals";
/// Food items attached to a meal with quantity and unit
pub const MEAL_FOOD_ITEMS: &str = "meal_food_items";
/// Consumed-meal log entries
pub const MEAL_LOGS: &str = "meal_logs";
/// Recipes
pub const RECIPES: &str = "recipes";
/// Recipe ingredients
pub const RECIPE_INGREDIENTS: &str = "recipe_ingredients";
/// Day type assignment per user and date
pub const DAY_TYPE_ASSIGNMENTS: &str = "day_type_assignments";
/// Supplements assigned to an athlete
pub const ATHLETE_SUPPLEMENTS: &str = "athlete_supplements";
/// Supplement intake logs
pub const SUPPLEMENT_LOGS: &str = "supplement_logs";
/// Workout programs with weekly schedules
pub const WORKOUT_PROGRAMS: &str = "workout_programs";
/// Completed workout sessions
pub const WORKOUT_SESSIONS: &str = "workout_sessions";
/// Sets performed within a workout session
pub const WORKOUT_SETS: &str = "workout_sets";
/// Daily water intake
pub const WATER_TRACKING: &str = "water_tracking";
/// Daily step counts
pub const STEP_ENTRIES: &str = "step_entries";
/// Athlete check-ins
pub const CHECK_INS: &str = "check_ins";
