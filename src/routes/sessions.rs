// ABOUTME: Completion route handlers for running, HIIT, and mobility workouts
// ABOUTME: Thin wrappers over the completion service keyed by activity type
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::put;
use axum::{Json, Router};
use repforge_core::errors::AppError;
use repforge_core::models::{ActivityType, RunningCompletionRequest, SessionCompletionRequest};

use crate::database::today;
use crate::middleware::AuthUser;
use crate::resources::ServerResources;
use crate::routes::UserQuery;
use crate::services::completion;

/// Session completion routes implementation
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create the running, HIIT, and mobility completion routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/saved_runs/complete-workout/:workout_id/",
                put(Self::handle_complete_run),
            )
            .route(
                "/api/saved_hiit/complete-workout/:workout_id/",
                put(Self::handle_complete_hiit),
            )
            .route(
                "/api/saved_mobility/complete-workout/:workout_id/",
                put(Self::handle_complete_mobility),
            )
            .with_state(resources)
    }

    /// Handle PUT /api/saved_runs/complete-workout/{id}/
    async fn handle_complete_run(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(workout_id): Path<i64>,
        Query(query): Query<UserQuery>,
        Json(request): Json<RunningCompletionRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let response = completion::complete_running_workout(
            &resources,
            owner_id,
            workout_id,
            &request,
            today(),
        )
        .await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/saved_hiit/complete-workout/{id}/
    async fn handle_complete_hiit(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(workout_id): Path<i64>,
        Query(query): Query<UserQuery>,
        Json(request): Json<SessionCompletionRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        Self::complete(&resources, owner_id, workout_id, ActivityType::Hiit, &request).await
    }

    /// Handle PUT /api/saved_mobility/complete-workout/{id}/
    async fn handle_complete_mobility(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(workout_id): Path<i64>,
        Query(query): Query<UserQuery>,
        Json(request): Json<SessionCompletionRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        Self::complete(&resources, owner_id, workout_id, ActivityType::Mobility, &request).await
    }

    async fn complete(
        resources: &ServerResources,
        owner_id: i64,
        workout_id: i64,
        activity: ActivityType,
        request: &SessionCompletionRequest,
    ) -> Result<Response, AppError> {
        let response = completion::complete_session_workout(
            resources,
            owner_id,
            workout_id,
            activity,
            request,
            today(),
        )
        .await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
