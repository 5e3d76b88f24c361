// ABOUTME: Completion-form reducers for each workout modality
// ABOUTME: Form state changes only through actions so updates apply in dispatch order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Workout Completion Forms
//!
//! Each form is built from a server response, mutated through an action enum,
//! and turned back into a request body. None of them perform I/O.

/// Gym sets, reps, weight, and per-movement notes
pub mod gym;
/// Running split times
pub mod running;
/// HIIT and mobility RPE and notes
pub mod session;

pub use gym::{GymAction, GymCompletionForm, SetValue, SummaryChange};
pub use running::{RunningAction, RunningCompletionForm};
pub use session::{SessionAction, SessionCompletionForm};
