// ABOUTME: In-process backend that stores table rows in memory
// ABOUTME: Supports filters, ordering, upsert merges, simulated outages, and injected failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{plain_value, BackendClient, Direction, Filter, FilterOp, Query};
use crate::errors::{AppError, AppResult};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tokio::sync::RwLock;
use uuid::Uuid;

const SERVICE: &str = "backend";

/// Backend keeping every table in memory
///
/// Embedded resources in `select` column lists are not resolved; rows are
/// returned exactly as stored, so tests store nested rows pre-joined.
#[derive(Debug)]
pub struct InMemoryBackend {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    available: AtomicBool,
    injected_failures: RwLock<VecDeque<u16>>,
    write_log: RwLock<Vec<String>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Empty, reachable backend
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            injected_failures: RwLock::new(VecDeque::new()),
            write_log: RwLock::new(Vec::new()),
        }
    }

    /// Simulate losing or regaining the network; unavailable calls fail as retryable
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    /// Make the next write fail with an upstream `status`
    pub async fn fail_next_write(&self, status: u16) {
        self.injected_failures.write().await.push_back(status);
    }

    /// Seed rows without going through the write path
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .write()
            .await
            .entry(table.to_owned())
            .or_default()
            .extend(rows);
    }

    /// Every row of `table`
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Successful writes in order, as `"{op} {table} {id}"`
    pub async fn write_log(&self) -> Vec<String> {
        self.write_log.read().await.clone()
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::external_unavailable(SERVICE, "network unreachable"))
        }
    }

    async fn begin_write(&self) -> AppResult<()> {
        self.ensure_available()?;
        match self.injected_failures.write().await.pop_front() {
            Some(status) => Err(AppError::from_upstream_status(
                SERVICE,
                status,
                "injected failure",
            )),
            None => Ok(()),
        }
    }

    async fn log_write(&self, op: &str, table: &str, row: &Value) {
        let id = row.get("id").map(plain_value).unwrap_or_default();
        self.write_log
            .write()
            .await
            .push(format!("{op} {table} {id}"));
    }
}

fn rows_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        row => vec![row],
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) | (_, Value::Null) => None,
        _ => {
            let (left, right) = (plain_value(a), plain_value(b));
            match (left.parse::<f64>(), right.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y),
                _ => Some(left.cmp(&right)),
            }
        }
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let cell = row.get(&filter.column).unwrap_or(&Value::Null);
    let ordering = || compare(cell, &filter.value);
    match filter.op {
        FilterOp::Eq => ordering() == Some(Ordering::Equal),
        FilterOp::Neq => ordering() != Some(Ordering::Equal),
        FilterOp::Gt => ordering() == Some(Ordering::Greater),
        FilterOp::Gte => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lt => ordering() == Some(Ordering::Less),
        FilterOp::Lte => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
        FilterOp::In => filter.value.as_array().is_some_and(|options| {
            options
                .iter()
                .any(|option| compare(cell, option) == Some(Ordering::Equal))
        }),
    }
}

fn matches_all(row: &Value, query: &Query) -> bool {
    query.filters.iter().all(|filter| matches(row, filter))
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn with_id(mut row: Value) -> Value {
    if let Value::Object(fields) = &mut row {
        fields
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    }
    row
}

fn same_key(a: &Value, b: &Value, columns: &[&str]) -> bool {
    columns.iter().all(|column| match (a.get(column), b.get(column)) {
        (Some(x), Some(y)) => compare(x, y) == Some(Ordering::Equal),
        _ => false,
    })
}

#[async_trait::async_trait]
impl BackendClient for InMemoryBackend {
    async fn select(&self, query: &Query) -> AppResult<Vec<Value>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(row, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        rows.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|(column, direction)| {
                    let ordering = compare(
                        a.get(column).unwrap_or(&Value::Null),
                        b.get(column).unwrap_or(&Value::Null),
                    )
                    .unwrap_or(Ordering::Equal);
                    match direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Value) -> AppResult<Vec<Value>> {
        self.begin_write().await?;
        let new_rows: Vec<Value> = rows_of(rows).into_iter().map(with_id).collect();

        let mut tables = self.tables.write().await;
        let stored = tables.entry(table.to_owned()).or_default();
        for row in &new_rows {
            if stored.iter().any(|existing| same_key(existing, row, &["id"])) {
                return Err(AppError::from_upstream_status(
                    SERVICE,
                    409,
                    "duplicate key value violates unique constraint",
                ));
            }
        }
        stored.extend(new_rows.iter().cloned());
        drop(tables);

        for row in &new_rows {
            self.log_write("insert", table, row).await;
        }
        Ok(new_rows)
    }

    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>> {
        self.begin_write().await?;
        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(&query.table) {
            for row in rows.iter_mut().filter(|row| matches_all(row, query)) {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        drop(tables);

        for row in &updated {
            self.log_write("update", &query.table, row).await;
        }
        Ok(updated)
    }

    async fn upsert(&self, table: &str, rows: Value, on_conflict: &str) -> AppResult<Vec<Value>> {
        self.begin_write().await?;
        let columns: Vec<&str> = on_conflict.split(',').map(str::trim).collect();
        let new_rows: Vec<Value> = rows_of(rows).into_iter().map(with_id).collect();

        let mut tables = self.tables.write().await;
        let stored = tables.entry(table.to_owned()).or_default();
        let mut written = Vec::with_capacity(new_rows.len());
        for row in new_rows {
            if let Some(existing) = stored
                .iter_mut()
                .find(|existing| same_key(existing, &row, &columns))
            {
                merge(existing, &row);
                written.push(existing.clone());
            } else {
                stored.push(row.clone());
                written.push(row);
            }
        }
        drop(tables);

        for row in &written {
            self.log_write("upsert", table, row).await;
        }
        Ok(written)
    }

    async fn delete(&self, query: &Query) -> AppResult<u64> {
        self.begin_write().await?;
        let mut tables = self.tables.write().await;
        let mut removed = Vec::new();
        if let Some(rows) = tables.get_mut(&query.table) {
            let (gone, kept): (Vec<Value>, Vec<Value>) = rows
                .drain(..)
                .partition(|row| matches_all(row, query));
            *rows = kept;
            removed = gone;
        }
        drop(tables);

        for row in &removed {
            self.log_write("delete", &query.table, row).await;
        }
        Ok(removed.len() as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_filters_and_order() {
        let backend = InMemoryBackend::new();
        backend
            .seed(
                "step_entries",
                vec![
                    json!({"id": "1", "date": "2025-03-09", "steps": 9000}),
                    json!({"id": "2", "date": "2025-03-10", "steps": 4000}),
                    json!({"id": "3", "date": "2025-03-11", "steps": 12000}),
                ],
            )
            .await;

        let rows = backend
            .select(
                &Query::table("step_entries")
                    .gte("date", "2025-03-10")
                    .order("steps", Direction::Desc),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[tokio::test]
    async fn test_upsert_merges_on_conflict() {
        let backend = InMemoryBackend::new();
        backend
            .upsert("meal_logs", json!({"id": "a", "meal_id": "m1"}), "id")
            .await
            .unwrap();
        backend
            .upsert("meal_logs", json!({"id": "a", "meal_id": "m2"}), "id")
            .await
            .unwrap();
        let rows = backend.rows("meal_logs").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["meal_id"], "m2");
    }

    #[tokio::test]
    async fn test_unavailable_is_retryable() {
        let backend = InMemoryBackend::new();
        backend.set_available(false);
        let err = backend.select(&Query::table("meals")).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
