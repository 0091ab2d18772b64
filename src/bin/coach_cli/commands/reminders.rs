// ABOUTME: Reminder command for coach-cli
// ABOUTME: Fetches a user's day from the backend and prints the generated reminders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_coach::{
    backend::RestBackend,
    config::ServerConfig,
    context::AppContext,
    database::LocalDatabase,
    errors::{AppError, AppResult},
    reminders::ReminderGenerator,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::helpers::display::display_reminders;

type Result<T> = AppResult<T>;

/// Generate and print today's reminders for `user`
pub async fn print(
    database: &LocalDatabase,
    config: &ServerConfig,
    user: Uuid,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let backend = RestBackend::from_config(&config.backend)?;
    let ctx = AppContext::new(Arc::new(backend), database);
    let access_token = token
        .or_else(|| config.backend.anon_key.clone())
        .unwrap_or_default();
    ctx.sign_in(user, access_token).await;

    let reminders = ReminderGenerator::default().generate_for(&ctx).await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reminders)
                .map_err(|e| AppError::serialization(e.to_string()))?
        );
    } else {
        display_reminders(&reminders);
    }
    Ok(())
}
