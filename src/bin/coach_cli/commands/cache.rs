// ABOUTME: Cache commands for coach-cli
// ABOUTME: Lists keys, prints entries, and clears the persistent offline cache

use pierre_coach::{
    cache::{compile_pattern, Cache},
    database::LocalDatabase,
    errors::{AppError, AppResult},
};

type Result<T> = AppResult<T>;

/// Print stored keys, optionally filtered by a glob pattern
pub async fn keys(database: &LocalDatabase, pattern: Option<&str>) -> Result<()> {
    let cache = Cache::sqlite(database);
    let matcher = pattern.map(compile_pattern).transpose()?;
    let mut keys: Vec<String> = cache
        .keys()
        .await?
        .into_iter()
        .filter(|key| matcher.as_ref().is_none_or(|m| m.matches(key)))
        .collect();
    keys.sort();
    for key in &keys {
        println!("{key}");
    }
    println!("{} key(s)", keys.len());
    Ok(())
}

/// Print one entry with its freshness timestamp
pub async fn inspect(database: &LocalDatabase, key: &str) -> Result<()> {
    let entry = Cache::sqlite(database)
        .entry(key)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cache entry {key}")))?;
    println!("key:       {}", entry.key);
    println!("cached_at: {}", entry.cached_at.to_rfc3339());
    println!(
        "{}",
        serde_json::to_string_pretty(&entry.value).map_err(|e| AppError::serialization(e.to_string()))?
    );
    Ok(())
}

/// Remove matching entries, or everything without a pattern
pub async fn clear(database: &LocalDatabase, pattern: Option<&str>) -> Result<()> {
    let cache = Cache::sqlite(database);
    match pattern {
        Some(pattern) => {
            let removed = cache.invalidate_pattern(pattern).await?;
            println!("Removed {removed} entr{}", if removed == 1 { "y" } else { "ies" });
        }
        None => {
            cache.clear_all().await?;
            println!("Cache cleared");
        }
    }
    Ok(())
}
