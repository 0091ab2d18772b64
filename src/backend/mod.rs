// ABOUTME: Table-oriented client abstraction over the hosted relational backend
// ABOUTME: Query builder with PostgREST-style filters, ordering, and limits plus typed helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Backend client
//!
//! The hosted backend is consumed as a set of tables. [`BackendClient`] covers
//! the five operations the coaching data layer needs (`select`, `insert`,
//! `update`, `upsert`, `delete`). [`rest::RestBackend`] talks to a Supabase
//! project over PostgREST; [`memory::InMemoryBackend`] keeps rows in process
//! for tests and demos and can be switched unavailable to simulate going
//! offline.

/// In-process backend for tests and demos
pub mod memory;
/// Supabase / PostgREST backend
pub mod rest;

pub use memory::InMemoryBackend;
pub use rest::RestBackend;

use crate::errors::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `=`
    Eq,
    /// `<>`
    Neq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// Membership in a list
    In,
}

impl FilterOp {
    /// PostgREST operator name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }
}

/// Column filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column name
    pub column: String,
    /// Operator
    pub op: FilterOp,
    /// Operand; an array for [`FilterOp::In`]
    pub value: Value,
}

impl Filter {
    /// PostgREST query value, e.g. `eq.2025-03-10` or `in.(a,b)`
    #[must_use]
    pub fn to_postgrest(&self) -> String {
        if self.op == FilterOp::In {
            let items: Vec<String> = self
                .value
                .as_array()
                .map(|values| values.iter().map(plain_value).collect())
                .unwrap_or_default();
            return format!("in.({})", items.join(","));
        }
        format!("{}.{}", self.op.as_str(), plain_value(&self.value))
    }
}

/// Render a JSON scalar without quotes
pub(crate) fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Select/update/delete target: a table plus filters, ordering, and limit
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Table name
    pub table: String,
    /// Column list, PostgREST syntax (embedded resources allowed)
    pub columns: String,
    /// Filters, combined with AND
    pub filters: Vec<Filter>,
    /// Sort keys in priority order
    pub order: Vec<(String, Direction)>,
    /// Maximum rows returned
    pub limit: Option<usize>,
}

impl Query {
    /// Query over every column of `table`
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_owned(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Select specific columns
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Add a filter
    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl Serialize) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        });
        self
    }

    /// `column = value`
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    /// `column <> value`
    #[must_use]
    pub fn neq(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(column, FilterOp::Neq, value)
    }

    /// `column > value`
    #[must_use]
    pub fn gt(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(column, FilterOp::Gt, value)
    }

    /// `column >= value`
    #[must_use]
    pub fn gte(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    /// `column < value`
    #[must_use]
    pub fn lt(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(column, FilterOp::Lt, value)
    }

    /// `column <= value`
    #[must_use]
    pub fn lte(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    /// `column IN (values)`
    #[must_use]
    pub fn in_list<T: Serialize>(self, column: impl Into<String>, values: &[T]) -> Self {
        self.filter(column, FilterOp::In, values)
    }

    /// Sort by `column`
    #[must_use]
    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    /// Return at most `limit` rows
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?select={}", self.table, self.columns)?;
        for filter in &self.filters {
            write!(f, "&{}={}", filter.column, filter.to_postgrest())?;
        }
        Ok(())
    }
}

/// Table operations against the hosted backend
#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    /// Rows matching `query`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the query
    async fn select(&self, query: &Query) -> AppResult<Vec<Value>>;

    /// Insert one row or an array of rows, returning what was stored
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the rows
    async fn insert(&self, table: &str, rows: Value) -> AppResult<Vec<Value>>;

    /// Apply `patch` to every row matching `query`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the update
    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>>;

    /// Insert rows, merging into existing rows that collide on `on_conflict`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the rows
    async fn upsert(&self, table: &str, rows: Value, on_conflict: &str) -> AppResult<Vec<Value>>;

    /// Delete every row matching `query`, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the delete
    async fn delete(&self, query: &Query) -> AppResult<u64>;

    /// Bearer token of the signed-in user; `None` falls back to the anonymous key
    async fn set_access_token(&self, _token: Option<String>) {}
}

/// Typed [`BackendClient::select`]
///
/// # Errors
///
/// Returns an error if the query fails or a row does not match `T`
pub async fn select_as<T: DeserializeOwned>(
    backend: &dyn BackendClient,
    query: &Query,
) -> AppResult<Vec<T>> {
    backend
        .select(query)
        .await?
        .into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| {
                AppError::serialization(format!("Unexpected row in {}: {e}", query.table))
            })
        })
        .collect()
}

/// First row of a typed select, if any
///
/// # Errors
///
/// Returns an error if the query fails or the row does not match `T`
pub async fn select_one<T: DeserializeOwned>(
    backend: &dyn BackendClient,
    query: &Query,
) -> AppResult<Option<T>> {
    let query = query.clone().limit(1);
    Ok(select_as(backend, &query).await?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgrest_filter_rendering() {
        let query = Query::table("step_entries")
            .eq("user_id", "abc")
            .gte("steps", 1000)
            .in_list("date", &["2025-03-10", "2025-03-11"]);
        assert_eq!(
            query.to_string(),
            "step_entries?select=*&user_id=eq.abc&steps=gte.1000&date=in.(2025-03-10,2025-03-11)"
        );
    }
}
