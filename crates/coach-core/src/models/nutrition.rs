// ABOUTME: Nutrition models for foods, meals, recipes, and meal logs
// ABOUTME: Per-100g food values, measurement units, and additive nutrition totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// Type of meal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Breakfast meal
    Breakfast,
    /// Lunch meal
    Lunch,
    /// Dinner meal
    Dinner,
    /// Snack between meals
    Snack,
    /// Pre-workout meal
    PreWorkout,
    /// Post-workout meal
    PostWorkout,
    /// Unspecified or other meal type
    #[default]
    #[serde(other)]
    Other,
}

/// Where a food item's nutrition data came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FoodSource {
    /// Entered by a coach or athlete
    #[default]
    Custom,
    /// Open Food Facts product database
    OpenFoodFacts,
    /// USDA `FoodData` Central
    Usda,
}

impl FoodSource {
    /// Stable string form used in cache keys
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::OpenFoodFacts => "open_food_facts",
            Self::Usda => "usda",
        }
    }
}

/// Measurement unit for a food quantity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FoodUnit {
    /// Grams (base unit)
    #[default]
    #[serde(rename = "g", alias = "grams", alias = "gram")]
    Grams,
    /// Kilograms
    #[serde(rename = "kg", alias = "kilograms")]
    Kilograms,
    /// Milligrams
    #[serde(rename = "mg", alias = "milligrams")]
    Milligrams,
    /// Ounces
    #[serde(rename = "oz", alias = "ounces")]
    Ounces,
    /// Pounds
    #[serde(rename = "lb", alias = "pounds", alias = "lbs")]
    Pounds,
    /// Milliliters
    #[serde(rename = "ml", alias = "milliliters")]
    Milliliters,
    /// Liters
    #[serde(rename = "l", alias = "liters")]
    Liters,
    /// US cups
    #[serde(rename = "cup", alias = "cups")]
    Cups,
    /// Tablespoons
    #[serde(rename = "tbsp", alias = "tablespoons")]
    Tablespoons,
    /// Teaspoons
    #[serde(rename = "tsp", alias = "teaspoons")]
    Teaspoons,
    /// One labelled serving of the food
    #[serde(rename = "serving", alias = "servings")]
    Serving,
    /// One whole piece (egg, banana)
    #[serde(rename = "piece", alias = "pieces", alias = "unit")]
    Piece,
}

impl FoodUnit {
    /// Canonical short label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grams => "g",
            Self::Kilograms => "kg",
            Self::Milligrams => "mg",
            Self::Ounces => "oz",
            Self::Pounds => "lb",
            Self::Milliliters => "ml",
            Self::Liters => "l",
            Self::Cups => "cup",
            Self::Tablespoons => "tbsp",
            Self::Teaspoons => "tsp",
            Self::Serving => "serving",
            Self::Piece => "piece",
        }
    }

    /// Whether this unit measures volume
    #[must_use]
    pub const fn is_volume(self) -> bool {
        matches!(
            self,
            Self::Milliliters | Self::Liters | Self::Cups | Self::Tablespoons | Self::Teaspoons
        )
    }
}

impl fmt::Display for FoodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FoodUnit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
            .map_err(|_| AppError::invalid_input(format!("Unsupported unit: {s}")))
    }
}

/// A food with nutrition values expressed per 100 grams
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    /// Row id when stored in the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// Brand name (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Origin of the nutrition data
    #[serde(default)]
    pub source: FoodSource,
    /// Identifier in the origin database (barcode, FDC id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Energy per 100 g (kcal)
    pub calories_per_100g: f64,
    /// Protein per 100 g
    pub protein_per_100g: f64,
    /// Carbohydrates per 100 g
    pub carbs_per_100g: f64,
    /// Fat per 100 g
    pub fat_per_100g: f64,
    /// Fiber per 100 g
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_per_100g: Option<f64>,
    /// Weight of one labelled serving in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size_g: Option<f64>,
    /// Weight of one whole piece in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_weight_g: Option<f64>,
    /// Density used for volume units (grams per milliliter)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_g_per_ml: Option<f64>,
}

impl FoodItem {
    /// Create a custom food from its per-100g macros
    #[must_use]
    pub fn new(name: impl Into<String>, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            brand: None,
            source: FoodSource::Custom,
            external_id: None,
            calories_per_100g: calories,
            protein_per_100g: protein,
            carbs_per_100g: carbs,
            fat_per_100g: fat,
            fiber_per_100g: None,
            serving_size_g: None,
            piece_weight_g: None,
            density_g_per_ml: None,
        }
    }
}

/// Summed nutrition values
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct NutritionTotals {
    /// Energy (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein_g: f64,
    /// Carbohydrates (g)
    pub carbs_g: f64,
    /// Fat (g)
    pub fat_g: f64,
    /// Fiber (g)
    pub fiber_g: f64,
}

impl NutritionTotals {
    /// Multiply every value by `factor`
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fat_g: self.fat_g * factor,
            fiber_g: self.fiber_g * factor,
        }
    }

    /// Round every value to one decimal place for display
    #[must_use]
    pub fn rounded(self) -> Self {
        let round = |v: f64| (v * 10.0).round() / 10.0;
        Self {
            calories: round(self.calories),
            protein_g: round(self.protein_g),
            carbs_g: round(self.carbs_g),
            fat_g: round(self.fat_g),
            fiber_g: round(self.fiber_g),
        }
    }
}

impl Add for NutritionTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein_g: self.protein_g + rhs.protein_g,
            carbs_g: self.carbs_g + rhs.carbs_g,
            fat_g: self.fat_g + rhs.fat_g,
            fiber_g: self.fiber_g + rhs.fiber_g,
        }
    }
}

impl AddAssign for NutritionTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Food attached to a meal (`meal_food_items` row with the food embedded)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealFoodItem {
    /// Row id
    pub id: Uuid,
    /// Owning meal
    pub meal_id: Uuid,
    /// Embedded food
    pub food_item: FoodItem,
    /// Quantity in `unit`
    pub quantity: f64,
    /// Measurement unit
    #[serde(default)]
    pub unit: FoodUnit,
}

/// Planned meal for a user on a given day type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    /// Row id
    pub id: Uuid,
    /// Owning athlete
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Day type label selecting when this meal applies (None = every day)
    #[serde(default)]
    pub day_type: Option<String>,
    /// Meal category
    #[serde(default)]
    pub meal_type: MealType,
    /// Local time the meal is planned for
    #[serde(default)]
    pub scheduled_time: Option<NaiveTime>,
    /// Foods in the meal
    #[serde(default, rename = "meal_food_items")]
    pub food_items: Vec<MealFoodItem>,
}

/// Consumed-meal log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealLog {
    /// Row id
    pub id: Uuid,
    /// Owning athlete
    pub user_id: Uuid,
    /// Logged meal
    pub meal_id: Uuid,
    /// Local calendar date
    pub date: NaiveDate,
    /// When the log was recorded
    pub logged_at: DateTime<Utc>,
}

/// Day type assignment (`day_type_assignments` row)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayTypeAssignment {
    /// Athlete
    pub user_id: Uuid,
    /// Local calendar date
    pub date: NaiveDate,
    /// Day type label, e.g. "Training Day"
    pub day_type: String,
}

/// Ingredient of a recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredient {
    /// Embedded food
    pub food_item: FoodItem,
    /// Quantity in `unit`
    pub quantity: f64,
    /// Measurement unit
    #[serde(default)]
    pub unit: FoodUnit,
}

/// Recipe with ingredients and yield
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    /// Row id
    pub id: Uuid,
    /// Author
    pub user_id: Uuid,
    /// Recipe name
    pub name: String,
    /// Number of servings the recipe yields
    pub servings: f64,
    /// Ingredients
    #[serde(default, rename = "recipe_ingredients")]
    pub ingredients: Vec<RecipeIngredient>,
}
