// ABOUTME: Rule-based workout planner for gym and HIIT sessions
// ABOUTME: Turns a movement catalog and a request into ready-to-save workout plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Repforge Planner
//!
//! Pure generation logic with no I/O. Callers pass the movement catalog and a
//! random number generator, so the server can use a thread RNG while tests
//! seed a deterministic one.
//!
//! ## Modules
//!
//! - **rules**: Movement matching rules and the per-plan picker
//! - **gym**: Section layouts by duration and body area
//! - **hiit**: AMRAP, EMOM, Tabata, and 30/30 templates

/// Movement matching rules and picker
pub mod rules;

/// Gym workout generation
pub mod gym;

/// HIIT workout generation
pub mod hiit;

pub use gym::{generate_gym_plans, GymPlan, GymRequest, GymSection};
pub use hiit::{generate_hiit_plans, HiitBlock, HiitFormat, HiitPlan, HiitRequest};
pub use rules::{MovementPicker, MovementRule, PlannedMovement};
