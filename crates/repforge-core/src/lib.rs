// ABOUTME: Core types and constants for the Repforge training platform
// ABOUTME: Foundation crate with error handling, constants, and the shared domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Repforge Core
//!
//! Foundation crate shared by the server, the workout planner, and the client.
//! It changes rarely, which keeps incremental builds of the other crates fast.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Scoring values, statistics windows, and service defaults
//! - **models**: Workout, session, catalog, progress, social, and user types

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Domain models and wire types
pub mod models;
