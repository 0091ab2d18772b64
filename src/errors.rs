// ABOUTME: Unified error handling re-exported from coach-core
// ABOUTME: AppError carries an ErrorCode that maps to HTTP status and retryability
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Error handling
//!
//! The error taxonomy lives in `coach-core` so that the pure computation crate
//! and the service layer share one type. With the `http-response` feature
//! enabled, `AppError` renders as a JSON `ErrorResponse` in axum handlers.

pub use coach_core::errors::{AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse};
