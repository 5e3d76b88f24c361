// ABOUTME: Saved equipment filter route handlers
// ABOUTME: Owner-scoped CRUD for named equipment lists used to filter the movement catalog
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Equipment filter routes
//!
//! Filters are private: another user's filter answers 404 exactly like a
//! missing one.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use repforge_core::errors::AppError;
use repforge_core::models::EquipmentFilterRequest;
use tracing::info;

use crate::middleware::AuthUser;
use crate::resources::ServerResources;
use crate::routes::UserQuery;

/// Equipment filter routes implementation
pub struct EquipmentFilterRoutes;

impl EquipmentFilterRoutes {
    /// Create all equipment filter routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/saved_equipment_filters/get_all/",
                get(Self::handle_list),
            )
            .route(
                "/api/saved_equipment_filters/create/",
                post(Self::handle_create),
            )
            .route(
                "/api/saved_equipment_filters/:filter_id/get/",
                get(Self::handle_get),
            )
            .route(
                "/api/saved_equipment_filters/:filter_id/update/",
                put(Self::handle_update),
            )
            .route(
                "/api/saved_equipment_filters/:filter_id/delete/",
                delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/saved_equipment_filters/get_all/
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Query(query): Query<UserQuery>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(query.user_id)?;
        let filters = resources
            .database
            .equipment_filters()
            .list_filters(owner_id)
            .await?;
        Ok((StatusCode::OK, Json(filters)).into_response())
    }

    /// Handle POST /api/saved_equipment_filters/create/
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Json(request): Json<EquipmentFilterRequest>,
    ) -> Result<Response, AppError> {
        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::invalid_input("Filter name is required."))?;

        let filters = resources.database.equipment_filters();
        if filters.name_taken(auth.user_id, name, None).await? {
            return Err(AppError::invalid_input(
                "Filter with this name already exists for this user.",
            ));
        }

        let filter = filters
            .create_filter(auth.user_id, name, &request.equipment_ids)
            .await?;
        info!(user_id = auth.user_id, filter_id = filter.id, "Equipment filter created");
        Ok((StatusCode::CREATED, Json(filter)).into_response())
    }

    /// Handle GET /api/saved_equipment_filters/{id}/get/
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(filter_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let filter = resources
            .database
            .equipment_filters()
            .get_filter(auth.user_id, filter_id)
            .await?
            .ok_or_else(|| AppError::not_found("Equipment filter"))?;
        Ok((StatusCode::OK, Json(filter)).into_response())
    }

    /// Handle PUT /api/saved_equipment_filters/{id}/update/
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(filter_id): Path<i64>,
        Json(request): Json<EquipmentFilterRequest>,
    ) -> Result<Response, AppError> {
        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let filters = resources.database.equipment_filters();
        if let Some(name) = name {
            if filters.name_taken(auth.user_id, name, Some(filter_id)).await? {
                return Err(AppError::invalid_input(
                    "Filter name must be unique for this user.",
                ));
            }
        }

        let filter = filters
            .update_filter(auth.user_id, filter_id, name, &request.equipment_ids)
            .await?;
        info!(user_id = auth.user_id, filter_id, "Equipment filter updated");
        Ok((StatusCode::OK, Json(filter)).into_response())
    }

    /// Handle DELETE /api/saved_equipment_filters/{id}/delete/
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(filter_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let deleted = resources
            .database
            .equipment_filters()
            .delete_filter(auth.user_id, filter_id)
            .await?;
        if !deleted {
            return Err(AppError::not_found("Equipment filter"));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
