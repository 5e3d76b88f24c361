// ABOUTME: Workout generation routes for gym and HIIT plans
// ABOUTME: Loads the movement catalog and hands it to the planner crate
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use repforge_core::errors::AppError;
use repforge_planner::{generate_gym_plans, generate_hiit_plans, GymRequest, HiitRequest};
use tracing::info;

use crate::middleware::AuthUser;
use crate::resources::ServerResources;

/// Planner routes implementation
pub struct PlannerRoutes;

impl PlannerRoutes {
    /// Create the gym and HIIT generation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/planner/gym/", post(Self::handle_gym))
            .route("/api/planner/hiit/", post(Self::handle_hiit))
            .with_state(resources)
    }

    /// Handle POST /api/planner/gym/
    async fn handle_gym(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Json(request): Json<GymRequest>,
    ) -> Result<Response, AppError> {
        if request.body_area.trim().is_empty() {
            return Err(AppError::invalid_input("body_area is required"));
        }
        let catalog = resources.database.movements().list_movements().await?;
        let plans = generate_gym_plans(&catalog, &request, &mut rand::thread_rng());

        info!(
            user_id = auth.user_id,
            body_area = %request.body_area,
            plans = plans.len(),
            "Generated gym plans"
        );
        Ok((StatusCode::OK, Json(plans)).into_response())
    }

    /// Handle POST /api/planner/hiit/
    async fn handle_hiit(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Json(request): Json<HiitRequest>,
    ) -> Result<Response, AppError> {
        let catalog = resources.database.movements().list_movements().await?;
        let plans = generate_hiit_plans(&catalog, &request, &mut rand::thread_rng());

        info!(
            user_id = auth.user_id,
            workout_type = request.workout_type.as_str(),
            plans = plans.len(),
            "Generated HIIT plans"
        );
        Ok((StatusCode::OK, Json(plans)).into_response())
    }
}
