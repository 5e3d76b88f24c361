// ABOUTME: Progress route handlers for the leaderboard, user statistics, and strength summaries
// ABOUTME: Stats are computed on first request and on demand with ?refresh=true
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use repforge_core::errors::{required, AppError};
use serde::Deserialize;

use crate::database::today;
use crate::middleware::AuthUser;
use crate::resources::ServerResources;
use crate::routes::UserQuery;
use crate::services::progress;

/// Query of the user stats endpoint
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    /// Recompute before answering
    #[serde(default)]
    pub refresh: bool,
}

/// Progress routes implementation
pub struct ProgressRoutes;

impl ProgressRoutes {
    /// Create leaderboard, user stats, and strength summary routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/leaderboard/", get(Self::handle_leaderboard))
            .route("/api/user_stats/:user_id/", get(Self::handle_user_stats))
            .route(
                "/api/movement_summary_stats/",
                get(Self::handle_movement_summary),
            )
            .with_state(resources)
    }

    /// Handle GET /api/leaderboard/
    async fn handle_leaderboard(
        State(resources): State<Arc<ServerResources>>,
        _auth: AuthUser,
    ) -> Result<Response, AppError> {
        let entries = resources.database.scores().list_entries().await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle GET /api/user_stats/{id}/
    async fn handle_user_stats(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(user_id): Path<i64>,
        Query(query): Query<StatsQuery>,
    ) -> Result<Response, AppError> {
        let user_id = auth.ensure_matches(Some(user_id))?;
        let stats = progress::user_stats(&resources, user_id, query.refresh, today()).await?;
        Ok((StatusCode::OK, Json(stats)).into_response())
    }

    /// Handle GET /api/movement_summary_stats/?user_id=
    async fn handle_movement_summary(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Query(query): Query<UserQuery>,
    ) -> Result<Response, AppError> {
        let requested = query.user_id.ok_or_else(|| required("user_id"))?;
        let owner_id = auth.ensure_matches(Some(requested))?;
        let summary = resources.database.strength().movement_summary(owner_id).await?;
        Ok((StatusCode::OK, Json(summary)).into_response())
    }
}
