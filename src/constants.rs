// ABOUTME: Re-export of the shared constants from coach-core
// ABOUTME: Keeps `crate::constants::*` paths stable for the service modules
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub use coach_core::constants::*;
