// ABOUTME: Authentication and profile route handlers
// ABOUTME: Registration, login, public and full profiles, profile updates, and onboarding
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Authentication routes
//!
//! Register and login are public and return a bearer token. Every other
//! route needs that token; profile writes are limited to the owner.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use repforge_core::errors::AppError;
use repforge_core::models::{LoginRequest, MessageResponse, ProfileUpdateRequest, RegisterRequest};
use tracing::info;

use crate::database::today;
use crate::middleware::AuthUser;
use crate::resources::ServerResources;
use crate::services::accounts;

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register/", post(Self::handle_register))
            .route("/api/auth/login/", post(Self::handle_login))
            .route("/api/auth/profile/:user_id/", get(Self::handle_profile))
            .route(
                "/api/auth/full-profile/:user_id/",
                get(Self::handle_full_profile),
            )
            .route(
                "/api/auth/update-profile/:user_id/",
                patch(Self::handle_update_profile),
            )
            .route(
                "/api/auth/complete-onboarding/:user_id/",
                post(Self::handle_complete_onboarding),
            )
            .with_state(resources)
    }

    /// Handle POST /api/auth/register/
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let response = accounts::register(&resources, &request).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/auth/login/
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let response = accounts::login(&resources, &request).await?;
        Ok((StatusCode::ACCEPTED, Json(response)).into_response())
    }

    /// Handle GET /api/auth/profile/{id}/ - any signed-in user may view
    async fn handle_profile(
        State(resources): State<Arc<ServerResources>>,
        _auth: AuthUser,
        Path(user_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let user = resources.database.users().require_user(user_id).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    /// Handle GET /api/auth/full-profile/{id}/
    async fn handle_full_profile(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(user_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let user_id = auth.ensure_matches(Some(user_id))?;
        let profile = accounts::full_profile(&resources, user_id, today()).await?;
        Ok((StatusCode::OK, Json(profile)).into_response())
    }

    /// Handle PATCH /api/auth/update-profile/{id}/
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(user_id): Path<i64>,
        Json(update): Json<ProfileUpdateRequest>,
    ) -> Result<Response, AppError> {
        let user_id = auth.ensure_matches(Some(user_id))?;
        let user = accounts::update_profile(&resources, user_id, &update).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    /// Handle POST /api/auth/complete-onboarding/{id}/
    async fn handle_complete_onboarding(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(user_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let user_id = auth.ensure_matches(Some(user_id))?;
        resources.database.users().complete_onboarding(user_id).await?;
        info!(user_id, "Onboarding completed");
        Ok((
            StatusCode::OK,
            Json(MessageResponse::new("Onboarding completed")),
        )
            .into_response())
    }
}
