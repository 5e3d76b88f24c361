// ABOUTME: Route module organization for the Repforge HTTP API
// ABOUTME: One router per domain, merged into a single application router
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Route module for the Repforge server
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the service layer or the database managers. Every router is
//! built with full `/api/...` paths and carries its own state, so the
//! application router is a plain merge.

use std::sync::Arc;

use axum::Router;
use repforge_core::models::flexible_id;
use serde::Deserialize;

use crate::resources::ServerResources;

/// Registration, login, and profile routes
pub mod auth;
/// Workout catalog template routes
pub mod catalog;
/// Chat room routes
pub mod chat;
/// Saved equipment filter routes
pub mod equipment_filters;
/// Health check and readiness routes
pub mod health;
/// Movement and equipment catalog routes
pub mod movements;
/// Push token and reminder routes
pub mod notifications;
/// Gym and HIIT generation routes
pub mod planner;
/// Leaderboard, user stats, and strength summary routes
pub mod progress;
/// Running, HIIT, and mobility completion routes
pub mod sessions;
/// Saved workout and workout section routes
pub mod workouts;

pub use auth::AuthRoutes;
pub use catalog::CatalogRoutes;
pub use chat::ChatRoutes;
pub use equipment_filters::EquipmentFilterRoutes;
pub use health::HealthRoutes;
pub use movements::MovementRoutes;
pub use notifications::NotificationRoutes;
pub use planner::PlannerRoutes;
pub use progress::ProgressRoutes;
pub use sessions::SessionRoutes;
pub use workouts::WorkoutRoutes;

/// `?user_id=` accepted by owner-scoped endpoints for older clients
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UserQuery {
    /// Owner the caller claims to be; must match the token subject when present
    #[serde(default, deserialize_with = "flexible_id::deserialize")]
    pub user_id: Option<i64>,
}

/// Every API route, each router carrying its own state
pub fn api_router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(AuthRoutes::routes(Arc::clone(resources)))
        .merge(MovementRoutes::routes(Arc::clone(resources)))
        .merge(WorkoutRoutes::routes(Arc::clone(resources)))
        .merge(SessionRoutes::routes(Arc::clone(resources)))
        .merge(CatalogRoutes::routes(Arc::clone(resources)))
        .merge(ProgressRoutes::routes(Arc::clone(resources)))
        .merge(NotificationRoutes::routes(Arc::clone(resources)))
        .merge(EquipmentFilterRoutes::routes(Arc::clone(resources)))
        .merge(ChatRoutes::routes(Arc::clone(resources)))
        .merge(PlannerRoutes::routes(Arc::clone(resources)))
}
