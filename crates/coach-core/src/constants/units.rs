// ABOUTME: Unit conversion constants for food quantities
// ABOUTME: Mass and volume factors to grams and milliliters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Grams per ounce
pub const GRAMS_PER_OZ: f64 = 28.35;
/// Grams per pound
pub const GRAMS_PER_LB: f64 = 453.6;
/// Grams per kilogram
pub const GRAMS_PER_KG: f64 = 1000.0;
/// Milliliters per US cup
pub const ML_PER_CUP: f64 = 240.0;
/// Milliliters per tablespoon
pub const ML_PER_TBSP: f64 = 15.0;
/// Milliliters per teaspoon
pub const ML_PER_TSP: f64 = 5.0;
/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;
/// Energy density of protein and carbohydrate (kcal per gram)
pub const KCAL_PER_GRAM_PROTEIN_CARBS: f64 = 4.0;
/// Energy density of fat (kcal per gram)
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;
