// ABOUTME: Coach CLI - command-line tool over the local offline store
// ABOUTME: Inspects and flushes the sync queue, browses the cache, computes nutrition, prints reminders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Show mutations waiting for replay
//! coach-cli queue pending
//!
//! # Replay the queue against the backend configured by SUPABASE_URL
//! coach-cli queue flush --token "$ACCESS_TOKEN"
//!
//! # Dead letters, and putting them back in line
//! coach-cli queue failed
//! coach-cli queue retry
//!
//! # Cache keys for one user, then one entry
//! coach-cli cache keys --pattern "user:*:nutrition:*"
//! coach-cli cache inspect "exercises:catalog:page:1"
//!
//! # Nutrition for 150 g of a food given per 100 g values
//! coach-cli nutrition calc --calories 379 --protein 13.2 --carbs 67.7 --fat 6.5 --quantity 150
//!
//! # Today's reminders for a user
//! coach-cli reminders --user 6f1c... --token "$ACCESS_TOKEN"
//! ```

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use pierre_coach::{
    config::ServerConfig, database::LocalDatabase, errors::AppResult, logging::LoggingConfig,
};
use tracing::info;
use uuid::Uuid;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "coach-cli",
    about = "Pierre Coach local store CLI",
    long_about = "Command-line tool for inspecting the offline cache and sync queue of the Pierre coaching app."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Local store URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Sync queue commands
    Queue {
        #[command(subcommand)]
        action: QueueCommand,
    },

    /// Cache commands
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },

    /// Nutrition computation
    Nutrition {
        #[command(subcommand)]
        action: NutritionCommand,
    },

    /// Print today's reminders for a user
    Reminders {
        /// User id
        #[arg(long)]
        user: Uuid,

        /// Backend access token
        #[arg(long)]
        token: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum QueueCommand {
    /// List pending mutations in replay order
    Pending {
        /// Maximum number of items
        #[arg(long, default_value = "50")]
        limit: i64,
    },

    /// Replay pending mutations against the backend
    Flush {
        /// User whose mutations are replayed
        #[arg(long)]
        user: Uuid,

        /// That user's backend access token
        #[arg(long)]
        token: String,
    },

    /// List dead-lettered mutations
    Failed,

    /// Move dead-lettered mutations back to pending
    Retry,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum CacheCommand {
    /// List cache keys
    Keys {
        /// Glob pattern filter (e.g. "user:*:steps:*")
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Print one cache entry
    Inspect {
        /// Cache key
        key: String,
    },

    /// Remove entries matching a pattern, or everything
    Clear {
        /// Glob pattern; omit to clear the whole cache
        #[arg(long)]
        pattern: Option<String>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum NutritionCommand {
    /// Nutrition for a quantity of a food given its per-100 g values
    Calc {
        /// kcal per 100 g
        #[arg(long)]
        calories: f64,

        /// Protein grams per 100 g
        #[arg(long, default_value = "0")]
        protein: f64,

        /// Carbohydrate grams per 100 g
        #[arg(long, default_value = "0")]
        carbs: f64,

        /// Fat grams per 100 g
        #[arg(long, default_value = "0")]
        fat: f64,

        /// Amount eaten
        #[arg(long)]
        quantity: f64,

        /// Unit of the amount (g, kg, mg, oz, lb, ml, l, cup, tbsp, tsp, serving, piece)
        #[arg(long, default_value = "g")]
        unit: String,

        /// Grams per serving, for the serving unit
        #[arg(long)]
        serving_g: Option<f64>,

        /// Grams per piece, for the piece unit
        #[arg(long)]
        piece_g: Option<f64>,

        /// Density in g/ml, for volume units
        #[arg(long)]
        density: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = LoggingConfig::for_cli(cli.verbose).init() {
        eprintln!("Logging setup failed: {e}");
    }

    match cli.command {
        Command::Nutrition {
            action:
                NutritionCommand::Calc {
                    calories,
                    protein,
                    carbs,
                    fat,
                    quantity,
                    unit,
                    serving_g,
                    piece_g,
                    density,
                },
        } => commands::nutrition::calc(
            commands::nutrition::FoodArgs {
                calories,
                protein,
                carbs,
                fat,
                serving_g,
                piece_g,
                density,
            },
            quantity,
            &unit,
        ),
        command => run_with_store(command, cli.database_url).await,
    }
}

/// Commands that need the local store
async fn run_with_store(command: Command, database_url: Option<String>) -> Result<()> {
    let config = ServerConfig::from_env()?;
    let database_url = database_url.unwrap_or_else(|| config.database_url.clone());
    info!("Opening local store: {}", database_url);
    let database = LocalDatabase::new(&database_url).await?;

    match command {
        Command::Queue { action } => match action {
            QueueCommand::Pending { limit } => commands::queue::pending(&database, limit).await?,
            QueueCommand::Flush { user, token } => {
                commands::queue::flush(&database, &config, user, token).await?;
            }
            QueueCommand::Failed => commands::queue::failed(&database).await?,
            QueueCommand::Retry => commands::queue::retry(&database).await?,
        },
        Command::Cache { action } => match action {
            CacheCommand::Keys { pattern } => {
                commands::cache::keys(&database, pattern.as_deref()).await?;
            }
            CacheCommand::Inspect { key } => commands::cache::inspect(&database, &key).await?,
            CacheCommand::Clear { pattern } => {
                commands::cache::clear(&database, pattern.as_deref()).await?;
            }
        },
        Command::Reminders { user, token, json } => {
            commands::reminders::print(&database, &config, user, token, json).await?;
        }
        Command::Nutrition { .. } => {}
    }

    Ok(())
}
