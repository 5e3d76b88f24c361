// ABOUTME: Saved workout route handlers for saving, listing, updating, and completing gym workouts
// ABOUTME: Also serves the workout section detail log used while a workout is in progress
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Saved workout routes
//!
//! Every route is owner-scoped. The caller is the token subject; a legacy
//! `user_id` query or body field must name the same user.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use repforge_core::errors::AppError;
use repforge_core::models::{
    flexible_id, DateUpdateRequest, MessageResponse, SaveWorkoutRequest, SingleWorkoutResponse,
    StatusUpdateRequest, WorkoutLogRequest,
};
use serde::Deserialize;

use crate::database::today;
use crate::middleware::AuthUser;
use crate::resources::ServerResources;
use crate::routes::UserQuery;
use crate::services::{completion, workouts};

/// Query of the upcoming workouts list
#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    /// Legacy owner parameter
    #[serde(default, deserialize_with = "flexible_id::deserialize")]
    pub user_id: Option<i64>,
    /// Only workouts scheduled today or later, soonest first
    #[serde(default)]
    pub upcoming: bool,
    /// Maximum number of workouts, ignored unless positive
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Saved workout routes implementation
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    /// Create all saved workout and workout section routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/saved_workouts/save-workout/",
                post(Self::handle_save_workout),
            )
            .route(
                "/api/saved_workouts/get-all-workouts/",
                get(Self::handle_list_workouts),
            )
            .route(
                "/api/saved_workouts/upcoming-workouts/",
                get(Self::handle_upcoming_workouts),
            )
            .route(
                "/api/saved_workouts/get-single-workout/:workout_id/",
                get(Self::handle_single_workout),
            )
            .route(
                "/api/saved_workouts/update-workout-status/:workout_id/",
                patch(Self::handle_update_status),
            )
            .route(
                "/api/saved_workouts/delete-workout/:workout_id/",
                delete(Self::handle_delete_workout),
            )
            .route(
                "/api/saved_workouts/update-workout-date/:workout_id/",
                patch(Self::handle_update_date),
            )
            .route(
                "/api/saved_workouts/complete-workout/:workout_id/",
                put(Self::handle_complete_workout),
            )
            .route(
                "/api/workout_sections/save-workout-details/",
                put(Self::handle_save_details),
            )
            .with_state(resources)
    }

    /// Handle POST /api/saved_workouts/save-workout/
    async fn handle_save_workout(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Json(request): Json<SaveWorkoutRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(request.user_id)?;
        let response = workouts::save_workout(&resources, owner_id, &request).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/saved_workouts/get-all-workouts/
    async fn handle_list_workouts(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Query(query): Query<UserQuery>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let workouts = resources.database.workouts().list_workouts(owner_id).await?;
        Ok((StatusCode::OK, Json(workouts)).into_response())
    }

    /// Handle GET /api/saved_workouts/upcoming-workouts/
    async fn handle_upcoming_workouts(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Query(query): Query<UpcomingQuery>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let workouts = resources
            .database
            .workouts()
            .upcoming_workouts(owner_id, query.upcoming, query.limit.unwrap_or(0), today())
            .await?;
        Ok((StatusCode::OK, Json(workouts)).into_response())
    }

    /// Handle GET /api/saved_workouts/get-single-workout/{id}/
    async fn handle_single_workout(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(workout_id): Path<i64>,
        Query(query): Query<UserQuery>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let manager = resources.database.workouts();
        let workout = manager.require_workout(owner_id, workout_id).await?;
        let workout = manager.populate(workout).await?;
        let movement_history = manager.movement_history(&workout).await?;

        Ok((
            StatusCode::OK,
            Json(SingleWorkoutResponse {
                workout,
                movement_history,
            }),
        )
            .into_response())
    }

    /// Handle PATCH /api/saved_workouts/update-workout-status/{id}/
    async fn handle_update_status(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(workout_id): Path<i64>,
        Query(query): Query<UserQuery>,
        Json(request): Json<StatusUpdateRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let response =
            workouts::update_status(&resources, owner_id, workout_id, &request, today()).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/saved_workouts/delete-workout/{id}/
    async fn handle_delete_workout(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(workout_id): Path<i64>,
        Query(query): Query<UserQuery>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let deleted = resources
            .database
            .workouts()
            .delete_workout(owner_id, workout_id)
            .await?;
        if !deleted {
            return Err(AppError::not_found("Workout"));
        }
        Ok((
            StatusCode::OK,
            Json(MessageResponse::new("Workout deleted successfully")),
        )
            .into_response())
    }

    /// Handle PATCH /api/saved_workouts/update-workout-date/{id}/
    async fn handle_update_date(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(workout_id): Path<i64>,
        Query(query): Query<UserQuery>,
        Json(request): Json<DateUpdateRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let response = workouts::update_date(&resources, owner_id, workout_id, &request).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/saved_workouts/complete-workout/{id}/
    async fn handle_complete_workout(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(workout_id): Path<i64>,
        Query(query): Query<UserQuery>,
        Json(request): Json<WorkoutLogRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let response =
            completion::complete_gym_workout(&resources, owner_id, workout_id, &request, today())
                .await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/workout_sections/save-workout-details/
    async fn handle_save_details(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Query(query): Query<UserQuery>,
        Json(request): Json<WorkoutLogRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let response = workouts::save_workout_details(&resources, owner_id, &request).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
