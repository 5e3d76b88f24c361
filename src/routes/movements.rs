// ABOUTME: Movement and equipment catalog route handlers
// ABOUTME: Lists movements, filters them by a saved equipment filter, and lists equipment
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use repforge_core::errors::AppError;
use repforge_core::models::{flexible_id, MessageResponse};
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::resources::ServerResources;

/// Query of the filtered movement list
#[derive(Debug, Default, Deserialize)]
pub struct FilteredMovementsQuery {
    /// Saved equipment filter to apply
    #[serde(default, deserialize_with = "flexible_id::deserialize")]
    pub filter_id: Option<i64>,
}

/// Movement catalog routes implementation
pub struct MovementRoutes;

impl MovementRoutes {
    /// Create all movement and equipment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/movements/extract-movements/",
                get(Self::handle_extract_movements),
            )
            .route(
                "/api/movements/filtered-movements/",
                get(Self::handle_filtered_movements),
            )
            .route("/api/equipment/", get(Self::handle_list_equipment))
            .with_state(resources)
    }

    /// Handle GET /api/movements/extract-movements/
    async fn handle_extract_movements(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let movements = resources.database.movements().list_movements().await?;
        if movements.is_empty() {
            return Ok((
                StatusCode::NOT_FOUND,
                Json(MessageResponse::new("No movements found.")),
            )
                .into_response());
        }
        Ok((StatusCode::OK, Json(movements)).into_response())
    }

    /// Handle GET /api/movements/filtered-movements/?filter_id=
    ///
    /// Filters are private, so applying one needs the owner's token.
    async fn handle_filtered_movements(
        State(resources): State<Arc<ServerResources>>,
        auth: Option<AuthUser>,
        Query(query): Query<FilteredMovementsQuery>,
    ) -> Result<Response, AppError> {
        let movements = resources.database.movements();
        let Some(filter_id) = query.filter_id else {
            return Ok((StatusCode::OK, Json(movements.list_movements().await?)).into_response());
        };

        let auth = auth.ok_or_else(AppError::auth_required)?;
        let filter = resources
            .database
            .equipment_filters()
            .get_filter(auth.user_id, filter_id)
            .await?
            .ok_or_else(|| AppError::not_found("Equipment filter"))?;

        let matching = movements.movements_for_equipment(&filter.equipment).await?;
        Ok((StatusCode::OK, Json(matching)).into_response())
    }

    /// Handle GET /api/equipment/
    async fn handle_list_equipment(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let equipment = resources.database.movements().list_equipment().await?;
        Ok((StatusCode::OK, Json(equipment)).into_response())
    }
}
