// ABOUTME: Notification route handlers for push tokens, the reminder inbox, and clearing it
// ABOUTME: Reminders are queued by workout scheduling and released by the background job
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use repforge_core::errors::AppError;
use repforge_core::models::{
    ClearNotificationsRequest, MessageResponse, NotificationList, PushTokenRequest, StatusResponse,
};
use tracing::info;

use crate::middleware::AuthUser;
use crate::resources::ServerResources;
use crate::routes::UserQuery;

/// Notification routes implementation
pub struct NotificationRoutes;

impl NotificationRoutes {
    /// Create all notification routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/notifications/set_token/", post(Self::handle_set_token))
            .route("/api/notifications/list/", get(Self::handle_list))
            .route("/api/notifications/clear/", post(Self::handle_clear))
            .with_state(resources)
    }

    /// Handle POST /api/notifications/set_token/
    async fn handle_set_token(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Json(request): Json<PushTokenRequest>,
    ) -> Result<Response, AppError> {
        let (Some(user_id), Some(token)) = (
            request.user_id,
            request.token.as_deref().map(str::trim).filter(|t| !t.is_empty()),
        ) else {
            return Err(AppError::invalid_input(
                "Missing 'user_id' or 'token' in request body.",
            ));
        };
        let user_id = auth.ensure_matches(Some(user_id))?;

        resources.database.users().set_push_token(user_id, token).await?;
        info!(user_id, "Push token saved");
        Ok((
            StatusCode::OK,
            Json(StatusResponse {
                status: "Token saved successfully!".to_owned(),
            }),
        )
            .into_response())
    }

    /// Handle GET /api/notifications/list/
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Query(query): Query<UserQuery>,
    ) -> Result<Response, AppError> {
        let user_id = auth.ensure_matches(query.user_id)?;
        let notifications = resources.database.notifications().list_released(user_id).await?;
        Ok((StatusCode::OK, Json(NotificationList { notifications })).into_response())
    }

    /// Handle POST /api/notifications/clear/
    async fn handle_clear(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Json(request): Json<ClearNotificationsRequest>,
    ) -> Result<Response, AppError> {
        let user_id = auth.ensure_matches(request.user_id)?;
        let cleared = resources.database.notifications().clear_all(user_id).await?;
        info!(user_id, cleared, "Notifications cleared");
        Ok((
            StatusCode::OK,
            Json(MessageResponse::new("Notifications cleared")),
        )
            .into_response())
    }
}
