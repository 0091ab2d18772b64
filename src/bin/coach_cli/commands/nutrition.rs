// ABOUTME: Nutrition command for coach-cli
// ABOUTME: Computes totals and macro split for a quantity of a food

use pierre_coach::{
    errors::{AppError, AppResult},
    intelligence::nutrition::{calculate_nutrition, macro_split},
    models::{FoodItem, FoodUnit},
};

use crate::helpers::display::display_nutrition;

type Result<T> = AppResult<T>;

/// Per-100 g values and unit conversions of the food
pub struct FoodArgs {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving_g: Option<f64>,
    pub piece_g: Option<f64>,
    pub density: Option<f64>,
}

/// Compute and print nutrition for `quantity` of the food in `unit`
pub fn calc(food: FoodArgs, quantity: f64, unit: &str) -> Result<()> {
    let unit: FoodUnit = serde_json::from_value(serde_json::Value::String(unit.to_owned()))
        .map_err(|_| AppError::invalid_input(format!("Unknown unit: {unit}")))?;

    let mut item = FoodItem::new("cli", food.calories, food.protein, food.carbs, food.fat);
    item.serving_size_g = food.serving_g;
    item.piece_weight_g = food.piece_g;
    item.density_g_per_ml = food.density;

    let totals = calculate_nutrition(&item, quantity, unit)?;
    display_nutrition(quantity, unit, &totals, &macro_split(&totals));
    Ok(())
}
