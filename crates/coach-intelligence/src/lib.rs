// ABOUTME: Pure coaching computations shared by the offline services and the CLI
// ABOUTME: Nutrition scaling and aggregation, exercise name matching, linear pace expectations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Coach Intelligence
//!
//! Side-effect free computations. Nothing in this crate performs I/O, which
//! keeps every function trivially testable and benchmarkable.

/// Fuzzy matching of exercise names against the catalog
pub mod exercise_matching;
/// Food quantity scaling and meal/recipe aggregation
pub mod nutrition;
/// Linear pace expectations for daily targets (water, steps)
pub mod pace;

pub use exercise_matching::{levenshtein, match_exercise, name_similarity, ExerciseMatch, MatchConfig};
pub use nutrition::{
    calculate_nutrition, daily_totals, grams_for, macro_split, meal_totals, recipe_per_serving,
    recipe_totals, MacroSplit,
};
pub use pace::{expected_progress, PaceStatus, PaceWindow};
