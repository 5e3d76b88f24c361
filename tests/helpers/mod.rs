// ABOUTME: Shared test helpers for the HTTP integration tests
// ABOUTME: Exports the in-process axum request driver
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
