// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Output formatting helpers for coach-cli
// ABOUTME: Tables for queue items and reminders, plus nutrition and flush summaries

use pierre_coach::{
    intelligence::nutrition::MacroSplit,
    models::{FoodUnit, NutritionTotals, QueueItem},
    reminders::Reminder,
    sync::FlushReport,
};

/// Print queue items one per line
pub fn display_queue_items(items: &[QueueItem]) {
    if items.is_empty() {
        return;
    }
    println!("{}", "=".repeat(100));
    println!(
        "{:>6}  {:<36}  {:<16}  {:<6}  {:>8}  LAST ERROR",
        "SEQ", "ID", "ENTITY", "ACTION", "ATTEMPTS"
    );
    for item in items {
        println!(
            "{:>6}  {:<36}  {:<16}  {:<6}  {:>8}  {}",
            item.seq,
            item.id,
            item.entity.as_str(),
            item.action.as_str(),
            item.attempts,
            item.last_error.as_deref().unwrap_or("-")
        );
    }
    println!("{}", "=".repeat(100));
}

/// Print the outcome of a flush
pub fn display_flush_report(report: &FlushReport) {
    if report.offline {
        println!("Offline: nothing replayed ({} pending)", report.remaining);
        return;
    }
    println!("Flush complete");
    println!("   Synced:    {}", report.synced);
    println!("   Failed:    {}", report.failed);
    println!("   Deferred:  {}", report.deferred);
    println!("   Remaining: {}", report.remaining);
}

/// Print nutrition totals and the calorie split
pub fn display_nutrition(
    quantity: f64,
    unit: FoodUnit,
    totals: &NutritionTotals,
    split: &MacroSplit,
) {
    println!("Nutrition for {quantity} {unit}:");
    println!("   Calories: {:.1} kcal", totals.calories);
    println!("   Protein:  {:.1} g ({:.0}%)", totals.protein_g, split.protein_percent);
    println!("   Carbs:    {:.1} g ({:.0}%)", totals.carbs_g, split.carbs_percent);
    println!("   Fat:      {:.1} g ({:.0}%)", totals.fat_g, split.fat_percent);
    println!("   Fiber:    {:.1} g", totals.fiber_g);
}

/// Print reminders in priority order
pub fn display_reminders(reminders: &[Reminder]) {
    if reminders.is_empty() {
        println!("Nothing to remind today");
        return;
    }
    for reminder in reminders {
        let due = reminder
            .due_at
            .map_or_else(|| "--:--".to_owned(), |t| t.format("%H:%M").to_string());
        println!(
            "[{:<6}] {due}  {:<10}  {}: {}",
            format!("{:?}", reminder.priority).to_lowercase(),
            reminder.kind.as_str(),
            reminder.title,
            reminder.message
        );
    }
}
