// ABOUTME: Public catalog routes for running, mobility, strength, and conditioning templates
// ABOUTME: Read-only listings seeded by the seed-catalog binary
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use repforge_core::errors::AppError;

use crate::resources::ServerResources;

/// Catalog template routes implementation
pub struct CatalogRoutes;

impl CatalogRoutes {
    /// Create all template listing routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/running_sessions/all/", get(Self::handle_running))
            .route("/api/mobility_workouts/all/", get(Self::handle_mobility))
            .route(
                "/api/suggested_strength/all/",
                get(Self::handle_suggested_strength),
            )
            .route("/api/conditioning/all/", get(Self::handle_conditioning))
            .with_state(resources)
    }

    async fn handle_running(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let sessions = resources.database.catalog().list_running_sessions().await?;
        Ok((StatusCode::OK, Json(sessions)).into_response())
    }

    async fn handle_mobility(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let workouts = resources.database.catalog().list_mobility_workouts().await?;
        Ok((StatusCode::OK, Json(workouts)).into_response())
    }

    async fn handle_suggested_strength(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let sessions = resources.database.catalog().list_suggested_strength().await?;
        Ok((StatusCode::OK, Json(sessions)).into_response())
    }

    async fn handle_conditioning(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let pieces = resources.database.catalog().list_conditioning().await?;
        Ok((StatusCode::OK, Json(pieces)).into_response())
    }
}
