// ABOUTME: Nutrition computation for food quantities, meals, recipes, and daily totals
// ABOUTME: Converts any supported unit to grams and scales per-100g values linearly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition computation
//!
//! Food items store their nutrition per 100 g. A quantity in any supported
//! unit is first converted to grams, then every value is scaled by
//! `grams / 100`. The conversion is linear for a fixed unit, so doubling the
//! quantity doubles every nutrient.

use coach_core::constants::units::{
    GRAMS_PER_KG, GRAMS_PER_LB, GRAMS_PER_OZ, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN_CARBS,
    ML_PER_CUP, ML_PER_LITER, ML_PER_TBSP, ML_PER_TSP,
};
use coach_core::errors::{AppError, AppResult, ErrorCode};
use coach_core::models::{FoodItem, FoodUnit, Meal, NutritionTotals, Recipe};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Grams assumed for one serving when the food carries no serving size
const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// Density assumed for volume units when the food carries none (water)
const DEFAULT_DENSITY_G_PER_ML: f64 = 1.0;

/// Convert a quantity of `food` in `unit` to grams
///
/// # Errors
///
/// Returns an error if the quantity is negative or not finite, or if the
/// unit is `piece` and the food has neither a piece weight nor a serving size
pub fn grams_for(food: &FoodItem, quantity: f64, unit: FoodUnit) -> AppResult<f64> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("Quantity must be a non-negative number, got {quantity}"),
        ));
    }

    let grams = match unit {
        FoodUnit::Grams => quantity,
        FoodUnit::Kilograms => quantity * GRAMS_PER_KG,
        FoodUnit::Milligrams => quantity / GRAMS_PER_KG,
        FoodUnit::Ounces => quantity * GRAMS_PER_OZ,
        FoodUnit::Pounds => quantity * GRAMS_PER_LB,
        FoodUnit::Milliliters
        | FoodUnit::Liters
        | FoodUnit::Cups
        | FoodUnit::Tablespoons
        | FoodUnit::Teaspoons => {
            let ml_per_unit = match unit {
                FoodUnit::Liters => ML_PER_LITER,
                FoodUnit::Cups => ML_PER_CUP,
                FoodUnit::Tablespoons => ML_PER_TBSP,
                FoodUnit::Teaspoons => ML_PER_TSP,
                _ => 1.0,
            };
            let density = food.density_g_per_ml.unwrap_or(DEFAULT_DENSITY_G_PER_ML);
            quantity * ml_per_unit * density
        }
        FoodUnit::Serving => {
            let serving = food.serving_size_g.unwrap_or_else(|| {
                debug!(food = %food.name, "No serving size, assuming 100 g");
                DEFAULT_SERVING_GRAMS
            });
            quantity * serving
        }
        FoodUnit::Piece => {
            let piece = food
                .piece_weight_g
                .or(food.serving_size_g)
                .ok_or_else(|| {
                    AppError::invalid_input(format!(
                        "Food '{}' has no piece weight; use a weight unit",
                        food.name
                    ))
                })?;
            quantity * piece
        }
    };

    Ok(grams)
}

/// Nutrition for `quantity` of `food` measured in `unit`
///
/// # Errors
///
/// Returns an error if the quantity cannot be converted to grams
pub fn calculate_nutrition(
    food: &FoodItem,
    quantity: f64,
    unit: FoodUnit,
) -> AppResult<NutritionTotals> {
    let factor = grams_for(food, quantity, unit)? / 100.0;
    Ok(NutritionTotals {
        calories: food.calories_per_100g * factor,
        protein_g: food.protein_per_100g * factor,
        carbs_g: food.carbs_per_100g * factor,
        fat_g: food.fat_per_100g * factor,
        fiber_g: food.fiber_per_100g.unwrap_or(0.0) * factor,
    })
}

/// Sum of every food item in a meal
///
/// # Errors
///
/// Returns an error if any item's quantity cannot be converted
pub fn meal_totals(meal: &Meal) -> AppResult<NutritionTotals> {
    meal.food_items
        .iter()
        .map(|item| calculate_nutrition(&item.food_item, item.quantity, item.unit))
        .sum()
}

/// Sum over several meals
///
/// # Errors
///
/// Returns an error if any meal total fails
pub fn daily_totals<'a>(meals: impl IntoIterator<Item = &'a Meal>) -> AppResult<NutritionTotals> {
    meals.into_iter().map(meal_totals).sum()
}

/// Nutrition of the whole recipe
///
/// # Errors
///
/// Returns an error if any ingredient quantity cannot be converted
pub fn recipe_totals(recipe: &Recipe) -> AppResult<NutritionTotals> {
    recipe
        .ingredients
        .iter()
        .map(|ingredient| {
            calculate_nutrition(&ingredient.food_item, ingredient.quantity, ingredient.unit)
        })
        .sum()
}

/// Nutrition of one serving of the recipe
///
/// # Errors
///
/// Returns an error if the recipe yields no servings or an ingredient fails
pub fn recipe_per_serving(recipe: &Recipe) -> AppResult<NutritionTotals> {
    if recipe.servings <= 0.0 || !recipe.servings.is_finite() {
        return Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("Recipe '{}' must yield at least one serving", recipe.name),
        ));
    }
    Ok(recipe_totals(recipe)?.scaled(1.0 / recipe.servings))
}

/// Share of calories coming from each macronutrient
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MacroSplit {
    /// Percent of calories from protein
    pub protein_percent: f64,
    /// Percent of calories from carbohydrates
    pub carbs_percent: f64,
    /// Percent of calories from fat
    pub fat_percent: f64,
}

/// Macro split computed from grams (4/4/9 kcal per gram)
#[must_use]
pub fn macro_split(totals: &NutritionTotals) -> MacroSplit {
    let protein_kcal = totals.protein_g * KCAL_PER_GRAM_PROTEIN_CARBS;
    let carbs_kcal = totals.carbs_g * KCAL_PER_GRAM_PROTEIN_CARBS;
    let fat_kcal = totals.fat_g * KCAL_PER_GRAM_FAT;
    let total = protein_kcal + carbs_kcal + fat_kcal;
    if total <= 0.0 {
        return MacroSplit::default();
    }
    MacroSplit {
        protein_percent: protein_kcal / total * 100.0,
        carbs_percent: carbs_kcal / total * 100.0,
        fat_percent: fat_kcal / total * 100.0,
    }
}
