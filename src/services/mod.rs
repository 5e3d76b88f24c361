// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Keeps validation, transactions, and scoring rules out of the HTTP layer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Domain service layer
//!
//! Route handlers parse requests and enforce ownership; everything else lives
//! here so the scheduler and tests can drive the same rules without HTTP.

/// Registration, login, and profile assembly
pub mod accounts;

/// Gym, running, HIIT, and mobility completion flows
pub mod completion;

/// Leaderboard and user statistics recomputation
pub mod progress;

/// Due reminder release
pub mod reminders;

/// Saving, rescheduling, and logging saved workouts
pub mod workouts;
