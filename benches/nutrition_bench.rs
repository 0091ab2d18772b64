// ABOUTME: Criterion benchmarks for nutrition math and exercise name matching
// ABOUTME: Measures daily totals over realistic meal plans and catalog lookups by catalog size
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the pure computation crates.
//!
//! Totals are recomputed on every screen refresh and every generated
//! exercise is matched against the whole catalog, so both sit on hot paths.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pierre_coach::intelligence::nutrition::{daily_totals, recipe_per_serving};
use pierre_coach::intelligence::{calculate_nutrition, match_exercise, MatchConfig};
use pierre_coach::models::{
    Exercise, FoodItem, FoodUnit, Meal, MealFoodItem, MealType, Recipe, RecipeIngredient,
};
use uuid::Uuid;

const UNITS: [FoodUnit; 5] = [
    FoodUnit::Grams,
    FoodUnit::Ounces,
    FoodUnit::Cups,
    FoodUnit::Serving,
    FoodUnit::Piece,
];

#[allow(clippy::cast_precision_loss)]
fn food(index: usize) -> FoodItem {
    let mut food = FoodItem::new(
        format!("Food {index}"),
        80.0 + (index % 400) as f64,
        (index % 30) as f64,
        (index % 60) as f64,
        (index % 20) as f64,
    );
    food.serving_size_g = Some(30.0 + (index % 5) as f64 * 10.0);
    food.piece_weight_g = Some(50.0);
    food
}

#[allow(clippy::cast_precision_loss)]
fn meal_plan(meals: usize, items_per_meal: usize) -> Vec<Meal> {
    (0..meals)
        .map(|m| {
            let id = Uuid::new_v4();
            Meal {
                id,
                user_id: Uuid::nil(),
                name: format!("Meal {m}"),
                day_type: None,
                meal_type: MealType::Snack,
                scheduled_time: None,
                food_items: (0..items_per_meal)
                    .map(|i| MealFoodItem {
                        id: Uuid::new_v4(),
                        meal_id: id,
                        food_item: food(m * items_per_meal + i),
                        quantity: 1.0 + (i % 3) as f64,
                        unit: UNITS[i % UNITS.len()],
                    })
                    .collect(),
            }
        })
        .collect()
}

const EQUIPMENT: [&str; 4] = ["Barbell", "Dumbbell", "Cable", "Machine"];
const MOVEMENTS: [&str; 8] = [
    "Bench Press",
    "Row",
    "Squat",
    "Romanian Deadlift",
    "Curl",
    "Lateral Raise",
    "Lunge",
    "Shoulder Press",
];

fn catalog(size: usize) -> Vec<Exercise> {
    (0..size)
        .map(|index| {
            let equipment = EQUIPMENT[index % EQUIPMENT.len()];
            let movement = MOVEMENTS[(index / EQUIPMENT.len()) % MOVEMENTS.len()];
            Exercise {
                id: format!("ex-{index}"),
                name: format!("{equipment} {movement} {}", index / 32),
                muscle_groups: Vec::new(),
                equipment: Some(equipment.to_lowercase()),
                category: Some("strength".to_owned()),
            }
        })
        .collect()
}

fn bench_calculate_nutrition(c: &mut Criterion) {
    let item = food(7);
    c.bench_function("calculate_nutrition", |b| {
        b.iter(|| {
            for unit in UNITS {
                black_box(calculate_nutrition(black_box(&item), 2.0, unit).ok());
            }
        });
    });
}

fn bench_daily_totals(c: &mut Criterion) {
    let mut group = c.benchmark_group("daily_totals");
    for (meals, items) in [(3, 4), (6, 8), (8, 20)] {
        let plan = meal_plan(meals, items);
        group.throughput(Throughput::Elements((meals * items) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{meals}x{items}")),
            &plan,
            |b, plan| b.iter(|| black_box(daily_totals(plan.iter()).ok())),
        );
    }
    group.finish();
}

fn bench_recipe_per_serving(c: &mut Criterion) {
    let recipe = Recipe {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        name: "Batch chili".to_owned(),
        servings: 6.0,
        ingredients: (0..15)
            .map(|i| RecipeIngredient {
                food_item: food(i),
                quantity: 120.0,
                unit: FoodUnit::Grams,
            })
            .collect(),
    };
    c.bench_function("recipe_per_serving", |b| {
        b.iter(|| black_box(recipe_per_serving(black_box(&recipe)).ok()));
    });
}

fn bench_match_exercise(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_exercise");
    let config = MatchConfig::default();
    for size in [50, 500, 2_000] {
        let exercises = catalog(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &exercises, |b, exercises| {
            b.iter(|| {
                black_box(match_exercise(
                    black_box("db romanian deadlifts"),
                    exercises,
                    &config,
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_calculate_nutrition,
    bench_daily_totals,
    bench_recipe_per_serving,
    bench_match_exercise
);
criterion_main!(benches);
