// ABOUTME: Client library for Repforge apps: API calls, local session, and form state
// ABOUTME: Shared state changes go through reducers so concurrent responses apply in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Repforge Client
//!
//! - **session**: token, user id, and onboarding flag in a key-value store
//! - **api**: typed calls for every server endpoint
//! - **completion**: workout completion form reducers
//! - **notifications**: ticketed notification list

/// Typed HTTP API client
pub mod api;
/// Workout completion form reducers
pub mod completion;
/// Client error type
pub mod error;
/// Notification list store
pub mod notifications;
/// Local session storage
pub mod session;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult};
pub use notifications::{NotificationAction, NotificationCenter, NotificationStore};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
