// ABOUTME: Local store and application context fixtures for integration tests
// ABOUTME: In-memory SQLite, in-memory backend, and a fixed clock on a known weekday

use chrono::{DateTime, FixedOffset};
use pierre_coach::{
    backend::{BackendClient, InMemoryBackend},
    config::SyncConfig,
    context::AppContext,
    database::LocalDatabase,
    dates::{Clock, FixedClock},
};
use std::sync::Arc;
use uuid::Uuid;

/// Monday 2025-03-10, 09:00 at UTC-5
pub const MONDAY_MORNING: &str = "2025-03-10T09:00:00-05:00";

/// Everything a test needs around one signed-in athlete
pub struct TestApp {
    pub database: LocalDatabase,
    pub backend: Arc<InMemoryBackend>,
    pub clock: Arc<FixedClock>,
    pub ctx: AppContext,
    pub user_id: Uuid,
}

pub fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).expect("valid timestamp")
}

/// Fresh in-memory store
pub async fn memory_database() -> LocalDatabase {
    LocalDatabase::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Short backoff so tests can step past it with the clock
pub const fn test_sync_config() -> SyncConfig {
    SyncConfig {
        max_attempts: 3,
        base_backoff_secs: 1,
        max_backoff_secs: 8,
    }
}

/// Signed-in context at [`MONDAY_MORNING`]
pub async fn test_app() -> TestApp {
    test_app_at(MONDAY_MORNING).await
}

/// Signed-in context at `now`
pub async fn test_app_at(now: &str) -> TestApp {
    let database = memory_database().await;
    let backend = Arc::new(InMemoryBackend::new());
    let clock = Arc::new(FixedClock::new(at(now)));
    let ctx = AppContext::builder(Arc::clone(&backend) as Arc<dyn BackendClient>, &database)
        .clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .sync_config(test_sync_config())
        .build();
    let user_id = Uuid::new_v4();
    ctx.sign_in(user_id, "test-access-token").await;
    TestApp {
        database,
        backend,
        clock,
        ctx,
        user_id,
    }
}
